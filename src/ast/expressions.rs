use crate::Span;

use super::ast::Expr;

// LITERALS

/// Number Expression
/// Represents a numeric literal in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberExpr {
    pub value: f64,
    pub span: Span,
}

/// Variable Expression
/// A reference to a parameter, loop variable or `var` binding.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub name: String,
    pub span: Span,
}

// OPERATORS

/// Unary Expression
/// `!x` lowers to a call of the user function `unary!`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub opcode: char,
    pub operand: Box<Expr>,
    pub span: Span,
}

/// Binary Expression
/// `=` is assignment and needs a variable on the left; `+ - * <` are
/// built in; any other opcode calls the user function `binary<op>`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub opcode: char,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

/// Call Expression
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

// CONTROL FLOW

/// If Expression
/// `if cond then a else b`. Both arms are required.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub cond: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Box<Expr>,
    pub span: Span,
}

/// For Expression
/// `for i = start, end [, step] in body`. The step defaults to 1.0 and the
/// expression always evaluates to 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr {
    pub var_name: String,
    pub start: Box<Expr>,
    pub end: Box<Expr>,
    pub step: Option<Box<Expr>>,
    pub body: Box<Expr>,
    pub span: Span,
}

/// Var Expression
/// `var a = 1, b in body`. Bindings are installed left to right; a missing
/// initializer means 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct VarExpr {
    pub bindings: Vec<(String, Option<Expr>)>,
    pub body: Box<Expr>,
    pub span: Span,
}
