//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that turns the lexer's tokens into
//! top-level items. It uses recursive descent with precedence climbing
//! for binary operators and handles:
//!
//! - Function definitions, externs and bare top-level expressions
//! - Prototypes for plain functions and user-defined operators
//! - Expressions: calls, `if`, `for`, `var` and operator applications
//! - The operator registry shared with the code generator

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
