//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct. The parser pulls tokens
//! from the lexer one at a time and holds exactly one lookahead token.
//! Binary operator precedences come from the shared operator registry,
//! so operators installed by the code generator are visible to every
//! later parse.

use std::rc::Rc;

use crate::{
    ast::ast::TopLevel,
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::Lexer,
        tokens::{Token, TokenKind},
    },
    Position,
};

use super::{lookups::SharedOperators, stmt::parse_top_level};

/// The main parser structure that maintains parsing state.
///
/// This struct owns the lexer and the current token, and shares the
/// operator registry with the code generator.
pub struct Parser {
    /// Where tokens come from
    lexer: Lexer,
    /// The single lookahead token
    current: Token,
    /// Operator precedences, shared with the code generator
    operators: SharedOperators,
    /// Counter for generating unique IDs
    current_id: u32,
}

impl Parser {
    /// Creates a new Parser instance and reads the first token.
    ///
    /// # Arguments
    ///
    /// * `lexer` - The lexer to pull tokens from
    /// * `operators` - The operator registry shared with the code generator
    ///
    /// # Returns
    ///
    /// A new Parser instance positioned on the first token.
    pub fn new(mut lexer: Lexer, operators: SharedOperators) -> Self {
        let current = lexer.next_token();

        Parser {
            lexer,
            current,
            operators,
            current_id: 0,
        }
    }

    /// Creates a parser over `source`.
    ///
    /// # Arguments
    ///
    /// * `source` - The program text
    /// * `file` - Optional file name used in positions
    /// * `operators` - The operator registry shared with the code generator
    pub fn from_source(source: &str, file: Option<String>, operators: SharedOperators) -> Self {
        Parser::new(Lexer::new(source.to_string(), file), operators)
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.current
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current.kind
    }

    /// Advances to the next token and returns the previous token.
    ///
    /// Once the end of input is reached the lexer is not asked again; the
    /// parser stays on the `EOF` token.
    pub fn advance(&mut self) -> Token {
        if self.current.kind == TokenKind::EOF {
            return self.current.clone();
        }

        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    /// Expects a token of the specified kind, with optional custom error.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    /// * `error` - Optional custom error to return if expectation fails
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise returns an Error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current.kind != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: self.current.value.clone(),
                    },
                    self.get_position(),
                )),
            }
        } else {
            Ok(self.advance())
        }
    }

    /// Expects a token of the specified kind with default error message.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise returns a default Error.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Expects a token of the specified kind, failing with "expected
    /// `what`" when it is missing.
    pub fn expect_detailed(&mut self, expected_kind: TokenKind, what: &str) -> Result<Token, Error> {
        let error = self.detailed_error(&format!("expected {}", what));
        self.expect_error(expected_kind, Some(error))
    }

    /// Builds an `UnexpectedTokenDetailed` error at the current token.
    pub fn detailed_error(&self, message: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: self.current.value.clone(),
                message: message.to_string(),
            },
            self.get_position(),
        )
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current.kind != TokenKind::EOF
    }

    /// Returns the binary precedence of the current token, or `None` when it
    /// is not a registered binary operator.
    pub fn current_precedence(&self) -> Option<u32> {
        let symbol = self.current.kind.punct()?;
        self.operators.borrow().precedence(symbol)
    }

    /// Returns the shared operator registry.
    pub fn operators(&self) -> &SharedOperators {
        &self.operators
    }

    /// Advances the internal ID counter and returns the previous value.
    ///
    /// # Returns
    ///
    /// The current ID value before incrementing.
    pub fn advance_id(&mut self) -> u32 {
        let id = self.current_id;
        self.current_id += 1;
        id
    }

    /// Returns the position of the current token.
    pub fn get_position(&self) -> Position {
        self.current.span.start.clone()
    }

    /// Returns the name of the source file being parsed.
    pub fn file(&self) -> Rc<String> {
        self.lexer.file()
    }
}

/// Parses every top-level item of `source`, stopping at the first error.
///
/// Operators defined in the source are only installed when their
/// definition is compiled, so this sees the registry as it was passed in.
/// The driver interleaves parsing and compilation instead.
///
/// # Arguments
///
/// * `source` - The program text
/// * `file` - Optional file name used in positions
/// * `operators` - The operator registry to consult
///
/// # Returns
///
/// A Result containing either every parsed item or the first Error
pub fn parse(
    source: &str,
    file: Option<String>,
    operators: SharedOperators,
) -> Result<Vec<TopLevel>, Error> {
    let mut parser = Parser::from_source(source, file, operators);
    let mut items = vec![];

    while parser.has_tokens() {
        if parser.current_token_kind() == TokenKind::Punct(';') {
            parser.advance();
            continue;
        }

        items.push(parse_top_level(&mut parser)?);
    }

    Ok(items)
}
