//! The capabilities the code generator needs from a backend.
//!
//! The generator only ever talks to a [`TargetEmitter`]. Handles are small
//! `Copy` values owned by the emitter; the generator never looks inside them.

use std::fmt::Debug;

use crate::errors::errors::ErrorImpl;

/// Built-in instructions. `LessThan` and `NotEqual` produce a boolean that
/// must be widened with [`TargetEmitter::emit_bool_to_scalar`] before it can
/// be used as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    /// Unordered: true when either side is NaN.
    LessThan,
    /// Ordered: false when either side is NaN.
    NotEqual,
}

impl BinaryOpcode {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(BinaryOpcode::Add),
            '-' => Some(BinaryOpcode::Sub),
            '*' => Some(BinaryOpcode::Mul),
            '<' => Some(BinaryOpcode::LessThan),
            _ => None,
        }
    }

    /// Evaluates the instruction, with booleans as 1.0 and 0.0.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        let truth = |b: bool| if b { 1.0 } else { 0.0 };

        match self {
            BinaryOpcode::Add => lhs + rhs,
            BinaryOpcode::Sub => lhs - rhs,
            BinaryOpcode::Mul => lhs * rhs,
            BinaryOpcode::LessThan => truth(lhs.is_nan() || rhs.is_nan() || lhs < rhs),
            BinaryOpcode::NotEqual => truth(!lhs.is_nan() && !rhs.is_nan() && lhs != rhs),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            BinaryOpcode::Add => "fadd",
            BinaryOpcode::Sub => "fsub",
            BinaryOpcode::Mul => "fmul",
            BinaryOpcode::LessThan => "fcmp ult",
            BinaryOpcode::NotEqual => "fcmp one",
        }
    }
}

/// How conditions are tested: any value other than 0.0 (and NaN) is true.
pub fn is_truthy(value: f64) -> bool {
    BinaryOpcode::NotEqual.apply(value, 0.0) != 0.0
}

pub trait TargetEmitter {
    type Function: Copy + PartialEq + Debug;
    type Block: Copy + PartialEq + Debug;
    type Slot: Copy + PartialEq + Debug;
    type Value: Copy + PartialEq + Debug;

    /// Declares `name` with the given parameters, or returns the existing
    /// declaration. Fails when the existing function already has a body or
    /// takes a different number of parameters.
    fn declare_function(&mut self, name: &str, params: &[String]) -> Result<Self::Function, ErrorImpl>;

    /// A declared function and its parameter count.
    fn lookup_function(&self, name: &str) -> Option<(Self::Function, usize)>;

    /// Creates the entry block of `function` and moves the insertion point
    /// there.
    fn begin_function_body(&mut self, function: Self::Function) -> Self::Block;

    /// The incoming value of parameter `index`.
    fn argument(&mut self, function: Self::Function, index: usize) -> Self::Value;

    fn allocate_slot(&mut self, name: &str) -> Self::Slot;
    fn store(&mut self, slot: Self::Slot, value: Self::Value);
    fn load(&mut self, slot: Self::Slot) -> Self::Value;
    fn constant(&mut self, value: f64) -> Self::Value;

    fn emit_binary_op(&mut self, opcode: BinaryOpcode, lhs: Self::Value, rhs: Self::Value) -> Self::Value;
    fn emit_bool_to_scalar(&mut self, value: Self::Value) -> Self::Value;
    fn emit_call(&mut self, function: Self::Function, args: &[Self::Value]) -> Self::Value;

    fn emit_unary_call(&mut self, function: Self::Function, operand: Self::Value) -> Self::Value {
        self.emit_call(function, &[operand])
    }

    /// Appends a new, empty block to the function being built.
    fn new_block(&mut self, name: &str) -> Self::Block;
    fn current_block(&self) -> Self::Block;
    fn set_insertion_point(&mut self, block: Self::Block);

    fn branch(&mut self, target: Self::Block);
    fn cond_branch(&mut self, condition: Self::Value, then_block: Self::Block, else_block: Self::Block);

    /// Joins values arriving from different predecessor blocks.
    fn merge_values(&mut self, incoming: &[(Self::Value, Self::Block)]) -> Self::Value;

    fn finalize_function(&mut self, function: Self::Function, return_value: Self::Value);

    /// Removes `function` entirely, declaration included. Only valid when
    /// nothing else refers to it.
    fn discard_function(&mut self, function: Self::Function);

    /// Drops the body of `function` and keeps its declaration, so calls
    /// already emitted against it stay valid.
    fn discard_body(&mut self, function: Self::Function);
}
