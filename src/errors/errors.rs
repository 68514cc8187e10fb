use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// Parse errors come from the parser, everything else from code
    /// generation.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.internal_error,
            ErrorImpl::UnexpectedToken { .. }
                | ErrorImpl::UnexpectedTokenDetailed { .. }
                | ErrorImpl::NumberParseError { .. }
                | ErrorImpl::InvalidPrecedence { .. }
                | ErrorImpl::InvalidOperandCount { .. }
        )
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::InvalidPrecedence { .. } => "InvalidPrecedence",
            ErrorImpl::InvalidOperandCount { .. } => "InvalidOperandCount",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::FunctionNotDeclared { .. } => "FunctionNotDeclared",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::UnknownUnaryOperator { .. } => "UnknownUnaryOperator",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::ArityMismatch { .. } => "ArityMismatch",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}` when expecting an expression",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, a number has at most one `.`",
                token
            )),
            ErrorImpl::InvalidPrecedence { value } => ErrorTip::Suggestion(format!(
                "Invalid precedence `{}`, it must be between 1 and 100",
                value
            )),
            ErrorImpl::InvalidOperandCount {
                operator,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` takes {} operands, received {}",
                operator, expected, received
            )),
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::FunctionNotDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` not declared", function))
            }
            ErrorImpl::UnexpectedArguments {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                function, expected, received
            )),
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "The left-hand side of `=` must be a variable",
            )),
            ErrorImpl::UnknownUnaryOperator { operator } => ErrorTip::Suggestion(format!(
                "No `unary{}` function has been defined",
                operator
            )),
            ErrorImpl::FunctionAlreadyDeclared { .. } => ErrorTip::None,
            ErrorImpl::ArityMismatch {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` was declared with {} parameters, redeclared with {}",
                function, expected, received
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.position, self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Parsing
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("invalid precedence {value}: must be 1..100")]
    InvalidPrecedence { value: f64 },
    #[error("invalid number of operands for operator {operator:?}: expected {expected}, received {received}")]
    InvalidOperandCount {
        operator: String,
        expected: usize,
        received: usize,
    },

    // Code generation
    #[error("unknown variable name {variable:?}")]
    VariableNotDeclared { variable: String },
    #[error("unknown function referenced {function:?}")]
    FunctionNotDeclared { function: String },
    #[error("incorrect number of arguments passed to {function:?}: expected {expected}, received {received}")]
    UnexpectedArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("destination of '=' must be a variable")]
    InvalidAssignmentTarget,
    #[error("unknown unary operator {operator:?}")]
    UnknownUnaryOperator { operator: char },
    #[error("redefinition of function {function:?}")]
    FunctionAlreadyDeclared { function: String },
    #[error("redefinition of function {function:?} with different # args: expected {expected}, received {received}")]
    ArityMismatch {
        function: String,
        expected: usize,
        received: usize,
    },
}

/// Failures while running a program in one of the reference interpreters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("function {function:?} has no body and no host implementation")]
    MissingBody { function: String },
    #[error("unknown function {function:?}")]
    UnknownFunction { function: String },
    #[error("unknown variable {variable:?}")]
    UnknownVariable { variable: String },
    #[error("{function:?} called with {received} arguments, expected {expected}")]
    UnexpectedArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("destination of '=' must be a variable")]
    InvalidAssignmentTarget,
    #[error("slot {slot} read before it was written")]
    UnsetSlot { slot: usize },
    #[error("call depth exceeded the limit of {limit}")]
    DepthExceeded { limit: usize },
    #[error("block {block} of {function:?} has no terminator")]
    MissingTerminator { function: String, block: String },
}
