use std::fmt;

use thiserror::Error;

pub mod lexer;

pub use lexer::tokenize;

/// The symbol a branch tests the tape head against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// An empty cell
    Zero,
    /// A cell holding a stroke ("bâton")
    One,
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Symbol::Zero => '0',
            Symbol::One => '1',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // `I`: Print the state of the machine
    PrintState,
    // `P`: Pause until the user presses a key
    Pause,

    // `G`: Move the head one cell to the left
    MoveLeft,
    // `D`: Move the head one cell to the right
    MoveRight,

    // `0` / `1`: Write the symbol under the head
    Write(Symbol),

    // `si (0)` / `si (1)`: Run the block only if the head reads the symbol
    Branch(Symbol),
    // `boucle`: Repeat the block until a `fin`
    Loop,
    // `fin`: Leave the nearest loop, or stop the program outside of any loop
    Break,
    // `}`: Close the innermost `si` or `boucle`
    Close,

    // `#`: Required end of program marker
    EndOfFile,

    // Any other word, kept so the builder can report it
    Unknown(String),
}

impl Token {
    /// Classify a single lexeme
    pub fn from_word(word: &str) -> Token {
        match word {
            "I" => Token::PrintState,
            "P" => Token::Pause,
            "G" => Token::MoveLeft,
            "D" => Token::MoveRight,
            "0" => Token::Write(Symbol::Zero),
            "1" => Token::Write(Symbol::One),
            "si (0)" => Token::Branch(Symbol::Zero),
            "si (1)" => Token::Branch(Symbol::One),
            "boucle" => Token::Loop,
            "fin" => Token::Break,
            "}" => Token::Close,
            "#" => Token::EndOfFile,
            other => Token::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::PrintState => write!(f, "I"),
            Token::Pause => write!(f, "P"),
            Token::MoveLeft => write!(f, "G"),
            Token::MoveRight => write!(f, "D"),
            Token::Write(symbol) => write!(f, "{}", symbol.as_char()),
            Token::Branch(symbol) => write!(f, "si ({})", symbol.as_char()),
            Token::Loop => write!(f, "boucle"),
            Token::Break => write!(f, "fin"),
            Token::Close => write!(f, "}}"),
            Token::EndOfFile => write!(f, "#"),
            Token::Unknown(word) => write!(f, "{}", word),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LexerError {
    #[error("Empty word on line {line:}")]
    EmptyWord { line: usize },
}
