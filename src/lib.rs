extern crate thiserror;

pub mod export;
pub mod graph;
pub mod lexer;

use thiserror::Error;

pub use graph::{Condition, Edge, Graph, Instruction, Node, NodeId};
pub use lexer::{Symbol, Token};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO Error: {0}")]
    FileIO(
        #[from]
        std::io::Error,
    ),

    #[error("Lexer error: {0}")]
    Lexer(
        #[from]
        lexer::LexerError,
    ),

    #[error("Parser error: {0}")]
    Parser(
        #[from]
        graph::ParserError,
    ),

    #[error("Export error: {0}")]
    Export(
        #[from]
        export::ExportError,
    ),
}

/// How the bytes of a source file are turned into text
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    Utf8,
    /// ISO-8859-1, every byte is its own code point
    #[default]
    Latin1,
}

impl Encoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        let text = match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        };
        text.replace("\r\n", "\n")
    }
}

/// Tokenize and build a whole program
pub fn compile(text: &str) -> Result<Graph, Error> {
    let tokens = lexer::tokenize(text)?;
    Ok(graph::build(&tokens)?)
}
