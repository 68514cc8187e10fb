//! Lexical analysis module for the compiler.
//!
//! This module contains the pull lexer that turns source text into tokens
//! one at a time for the parser. It handles:
//!
//! - Identifiers and the reserved words of the language
//! - Numeric literals (greedy runs of digits and dots)
//! - Single-character punctuation, which is where operators come from
//! - `#` line comments and whitespace
//! - Line/column tracking for diagnostics

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
