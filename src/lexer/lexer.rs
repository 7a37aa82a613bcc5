use super::{LexerError, Token};

/// Marks the rest of the line as a comment
const COMMENT: char = '%';

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    /** Human Readable position of the last line read */
    pub cur_line: usize,

    lines: std::str::Split<'a, char>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Lexer<'a> {
        Lexer {
            cur_line: 0,
            // a `\r` left over from `\r\n` is just whitespace to us
            lines: text.split('\n'),
        }
    }

    /// Tokens of the next line, `None` once the text is exhausted
    pub fn next_line(&mut self) -> Option<Result<Vec<Token>, LexerError>> {
        let line = self.lines.next()?;
        self.cur_line += 1;
        Some(lex_line(line, self.cur_line))
    }

    pub fn collect_results(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut v = vec![];
        while let Some(line) = self.next_line() {
            v.extend(line?);
        }
        Ok(v)
    }
}

/// Tokenize a whole program
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::new(text).collect_results()
}

fn lex_line(line: &str, line_number: usize) -> Result<Vec<Token>, LexerError> {
    let normalized = normalize_line(line);

    let mut words = vec![];
    for part in normalized.split_whitespace() {
        let part = part.trim();
        let Some(first) = part.chars().next() else {
            return Err(LexerError::EmptyWord { line: line_number });
        };
        // comments run until the end of the line
        if first == COMMENT {
            break;
        }
        words.push(part);
    }

    let joined = words.join(" ");
    Ok(lexemes(&joined).into_iter().map(Token::from_word).collect())
}

/// Pulls `}` away from its neighbours and glues `si` arguments back together,
/// i.e. `si( 0 )D}` becomes `si (0)D } `
fn normalize_line(line: &str) -> String {
    let spaced = line.replace('}', " } ").replace('(', " (");

    let mut out = String::with_capacity(spaced.len());
    let mut chars = spaced.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '(' {
            out.push(c);
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
        } else if c.is_whitespace() {
            let mut run = String::from(c);
            while let Some(&n) = chars.peek() {
                if !n.is_whitespace() {
                    break;
                }
                run.push(n);
                chars.next();
            }
            // whitespace right before a `)` is dropped
            if chars.peek() != Some(&')') {
                out.push_str(&run);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Splits a single-spaced line into lexemes, `si (0)` and `si (1)` being the
/// only lexemes allowed to contain a space
fn lexemes(joined: &str) -> Vec<&str> {
    const BRANCHES: [&str; 2] = ["si (0)", "si (1)"];

    let mut v = vec![];
    let mut rest = joined;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break v;
        }

        let len = match BRANCHES.iter().find(|b| rest.starts_with(**b)) {
            Some(branch) => branch.len(),
            None => rest.find(' ').unwrap_or(rest.len()),
        };
        v.push(&rest[..len]);
        rest = &rest[len..];
    }
}
