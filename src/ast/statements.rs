use crate::Span;

use super::ast::Expr;

/// What a prototype declares: a plain function or an operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrototypeKind {
    Function,
    Unary(char),
    /// Operator symbol and its declared precedence.
    Binary(char, u32),
}

/// Function Prototype
/// The name and parameter names of a function, and whether it defines an
/// operator. Operator prototypes are named `unary<op>` / `binary<op>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
    pub kind: PrototypeKind,
    pub span: Span,
}

impl Prototype {
    pub fn new(name: &str, params: Vec<&str>) -> Self {
        Prototype {
            name: name.to_string(),
            params: params.into_iter().map(String::from).collect(),
            kind: PrototypeKind::Function,
            span: Span::null(),
        }
    }

    pub fn is_operator(&self) -> bool {
        self.kind != PrototypeKind::Function
    }

    pub fn is_binary_op(&self) -> bool {
        matches!(self.kind, PrototypeKind::Binary(..))
    }

    pub fn operator_name(&self) -> Option<char> {
        match self.kind {
            PrototypeKind::Function => None,
            PrototypeKind::Unary(op) | PrototypeKind::Binary(op, _) => Some(op),
        }
    }

    pub fn binary_precedence(&self) -> Option<u32> {
        match self.kind {
            PrototypeKind::Binary(_, precedence) => Some(precedence),
            _ => None,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Function Definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub prototype: Prototype,
    pub body: Expr,
}
