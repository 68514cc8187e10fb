use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::{Position, Span, MK_SPAN, MK_TOKEN};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// Handles one regex match at the lexer's current position. Returns the
/// produced token, or `None` when the matched text is skipped.
pub type RegexHandler = fn(&mut Lexer, &str) -> Option<Token>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new(r"^\s+").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^#[^\r\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new(r"^[A-Za-z][A-Za-z0-9]*").unwrap(), handler: symbol_handler },
        RegexPattern { regex: Regex::new(r"^[0-9.]+").unwrap(), handler: number_handler },
    ];
}

/// Pull lexer: each call to [`Lexer::next_token`] scans exactly one token.
///
/// The lexer cannot fail. Characters that start no identifier, number,
/// comment or whitespace come back one at a time as `Punct` tokens, and the
/// end of the source comes back as `EOF`.
#[derive(Clone)]
pub struct Lexer {
    source: String,
    pos: usize,
    line: u32,
    col: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            source,
            pos: 0,
            line: 1,
            col: 1,
            file: file_name,
        }
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }

    /// The position of the next unread character.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.col, self.pos as u32, Rc::clone(&self.file))
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    /// Consumes `text`, which must be the prefix of the remainder, keeping
    /// line and column in step. `\n`, `\r` and `\r\n` each end a line.
    pub fn advance_over(&mut self, text: &str) {
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' | '\r' => {
                    self.line += 1;
                    self.col = 1;
                }
                _ => self.col += 1,
            }
        }

        self.pos += text.len();
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            if self.at_eof() {
                let token = MK_TOKEN!(TokenKind::EOF, String::from("EOF"), MK_SPAN!(self, 0));
                trace!(line = self.line, col = self.col, "eof");
                return token;
            }

            let found = PATTERNS.iter().find_map(|pattern| {
                pattern
                    .regex
                    .find(self.remainder())
                    .map(|matched| (pattern.handler, matched.as_str().to_string()))
            });

            let produced = match found {
                Some((handler, text)) => handler(self, &text),
                None => Some(punct_handler(self)),
            };

            if let Some(token) = produced {
                trace!(
                    kind = %token.kind,
                    value = %token.value,
                    line = token.span.start.line,
                    col = token.span.start.col,
                    "token"
                );
                return token;
            }
        }
    }
}

fn skip_handler(lexer: &mut Lexer, matched: &str) -> Option<Token> {
    lexer.advance_over(matched);
    None
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) -> Option<Token> {
    let kind = RESERVED_LOOKUP
        .get(matched)
        .copied()
        .unwrap_or(TokenKind::Identifier);

    let token = MK_TOKEN!(kind, String::from(matched), MK_SPAN!(lexer, matched.len()));
    lexer.advance_over(matched);
    Some(token)
}

// Digits and dots are taken greedily; whether the text is a valid number is
// decided by the parser.
fn number_handler(lexer: &mut Lexer, matched: &str) -> Option<Token> {
    let token = MK_TOKEN!(TokenKind::Number, String::from(matched), MK_SPAN!(lexer, matched.len()));
    lexer.advance_over(matched);
    Some(token)
}

fn punct_handler(lexer: &mut Lexer) -> Token {
    let c = lexer.remainder().chars().next().unwrap_or('\0');
    let text = c.to_string();

    let token = MK_TOKEN!(TokenKind::Punct(c), text.clone(), MK_SPAN!(lexer, text.len()));
    lexer.advance_over(&text);
    token
}

/// Lexes the whole source eagerly. The returned vector always ends with
/// exactly one `EOF` token.
pub fn tokenize(source: String, file: Option<String>) -> Vec<Token> {
    let mut lex = Lexer::new(source, file);
    let mut tokens = vec![];

    loop {
        let token = lex.next_token();
        let done = token.kind == TokenKind::EOF;
        tokens.push(token);

        if done {
            return tokens;
        }
    }
}
