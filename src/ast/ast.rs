use crate::Span;

use super::{
    expressions::{
        BinaryExpr, CallExpr, ForExpr, IfExpr, NumberExpr, UnaryExpr, VarExpr, VariableExpr,
    },
    statements::{FunctionDef, Prototype},
};

/// Every expression node. Each variant owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(NumberExpr),
    Variable(VariableExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Call(CallExpr),
    If(IfExpr),
    For(ForExpr),
    Var(VarExpr),
}

impl Expr {
    /// The span of the token that introduced this node.
    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Number(e) => &e.span,
            Expr::Variable(e) => &e.span,
            Expr::Unary(e) => &e.span,
            Expr::Binary(e) => &e.span,
            Expr::Call(e) => &e.span,
            Expr::If(e) => &e.span,
            Expr::For(e) => &e.span,
            Expr::Var(e) => &e.span,
        }
    }

    // Constructors for building trees by hand. The nodes get a null span.

    pub fn number(value: f64) -> Expr {
        Expr::Number(NumberExpr {
            value,
            span: Span::null(),
        })
    }

    pub fn variable(name: &str) -> Expr {
        Expr::Variable(VariableExpr {
            name: name.to_string(),
            span: Span::null(),
        })
    }

    pub fn unary(opcode: char, operand: Expr) -> Expr {
        Expr::Unary(UnaryExpr {
            opcode,
            operand: Box::new(operand),
            span: Span::null(),
        })
    }

    pub fn binary(opcode: char, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(BinaryExpr {
            opcode,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span: Span::null(),
        })
    }

    pub fn call(callee: &str, args: Vec<Expr>) -> Expr {
        Expr::Call(CallExpr {
            callee: callee.to_string(),
            args,
            span: Span::null(),
        })
    }

    pub fn if_else(cond: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
        Expr::If(IfExpr {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            span: Span::null(),
        })
    }

    pub fn for_loop(var_name: &str, start: Expr, end: Expr, step: Option<Expr>, body: Expr) -> Expr {
        Expr::For(ForExpr {
            var_name: var_name.to_string(),
            start: Box::new(start),
            end: Box::new(end),
            step: step.map(Box::new),
            body: Box::new(body),
            span: Span::null(),
        })
    }

    pub fn var_in(bindings: Vec<(&str, Option<Expr>)>, body: Expr) -> Expr {
        Expr::Var(VarExpr {
            bindings: bindings
                .into_iter()
                .map(|(name, init)| (name.to_string(), init))
                .collect(),
            body: Box::new(body),
            span: Span::null(),
        })
    }
}

/// One item of a program, as the driver sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    Definition(FunctionDef),
    Extern(Prototype),
    /// A bare expression wrapped in an anonymous zero-parameter function.
    Expression(FunctionDef),
}

impl TopLevel {
    pub fn name(&self) -> &str {
        match self {
            TopLevel::Definition(function) | TopLevel::Expression(function) => {
                &function.prototype.name
            }
            TopLevel::Extern(prototype) => &prototype.name,
        }
    }
}
