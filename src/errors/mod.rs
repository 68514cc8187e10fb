//! Error types and error reporting for the compiler.
//!
//! This module defines the error types shared by the parser and the code
//! generator. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for parsing and code generation
//! - Helpful suggestions for each variant
//! - Diagnostic sinks the driver reports through

pub mod diagnostics;
pub mod errors;

#[cfg(test)]
mod tests;
