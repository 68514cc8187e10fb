//! Code generation module for the compiler.
//!
//! This module lowers the AST into basic blocks through the
//! [`emitter::TargetEmitter`] interface. It handles:
//!
//! - Function declaration, definition and the per-function state machine
//! - Expression lowering, including `if`/`for`/`var` control flow
//! - Scoped bindings of variables to storage slots
//! - The reference block-graph backend and its interpreter
//! - Host functions available to extern declarations
//! - LLVM lowering through inkwell (with the `llvm` feature)

pub mod compiler;
pub mod emitter;
pub mod expr;
pub mod interpreter;
pub mod ir;
#[cfg(feature = "llvm")]
pub mod llvm;
pub mod scope;
pub mod stdlib;

#[cfg(test)]
mod tests;
