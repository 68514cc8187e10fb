//! Unit tests for error handling.
//!
//! This module contains tests for error types, tips and diagnostic sinks.

use crate::errors::diagnostics::{CollectingSink, DiagnosticSink, TracingSink};
use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn at(line: u32, col: u32) -> Position {
    Position::new(line, col, 0, Rc::new("test.ks".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: ")".to_string(),
        },
        at(1, 10),
    );

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert!(error.is_parse_error());
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::VariableNotDeclared {
            variable: "x".to_string(),
        },
        at(4, 2),
    );

    assert_eq!(error.get_position().line, 4);
    assert_eq!(error.get_position().col, 2);
    assert!(!error.is_parse_error());
}

#[test]
fn test_error_display() {
    let error = Error::new(
        ErrorImpl::FunctionAlreadyDeclared {
            function: "fib".to_string(),
        },
        at(3, 5),
    );

    assert_eq!(error.to_string(), "test.ks:3:5: redefinition of function \"fib\"");
}

#[test]
fn test_number_parse_error() {
    let error = Error::new(
        ErrorImpl::NumberParseError {
            token: "1.2.3".to_string(),
        },
        at(1, 1),
    );

    assert_eq!(error.get_error_name(), "NumberParseError");
    assert!(error.is_parse_error());
    assert!(error.get_tip().to_string().contains("1.2.3"));
}

#[test]
fn test_invalid_precedence_error() {
    let error = Error::new(ErrorImpl::InvalidPrecedence { value: 101.0 }, at(1, 1));

    assert_eq!(error.get_error_name(), "InvalidPrecedence");
    assert!(error.is_parse_error());
    assert_eq!(
        error.get_impl().to_string(),
        "invalid precedence 101: must be 1..100"
    );
}

#[test]
fn test_invalid_operand_count_error() {
    let error = Error::new(
        ErrorImpl::InvalidOperandCount {
            operator: "binary|".to_string(),
            expected: 2,
            received: 1,
        },
        at(1, 1),
    );

    assert_eq!(error.get_error_name(), "InvalidOperandCount");
    assert!(error.is_parse_error());
}

#[test]
fn test_unexpected_arguments_error() {
    let error = Error::new(
        ErrorImpl::UnexpectedArguments {
            function: "fib".to_string(),
            expected: 1,
            received: 2,
        },
        at(1, 1),
    );

    assert_eq!(error.get_error_name(), "UnexpectedArguments");
    assert_eq!(
        error.get_tip().to_string(),
        "`fib` expects 1 arguments, received 2"
    );
}

#[test]
fn test_codegen_error_names() {
    let cases = vec![
        (ErrorImpl::InvalidAssignmentTarget, "InvalidAssignmentTarget"),
        (ErrorImpl::UnknownUnaryOperator { operator: '!' }, "UnknownUnaryOperator"),
        (
            ErrorImpl::FunctionNotDeclared {
                function: "g".to_string(),
            },
            "FunctionNotDeclared",
        ),
        (
            ErrorImpl::ArityMismatch {
                function: "g".to_string(),
                expected: 1,
                received: 2,
            },
            "ArityMismatch",
        ),
    ];

    for (error_impl, name) in cases {
        let error = Error::new(error_impl, at(1, 1));
        assert_eq!(error.get_error_name(), name);
        assert!(!error.is_parse_error());
    }
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::FunctionAlreadyDeclared {
            function: "f".to_string(),
        },
        at(1, 1),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_collecting_sink_keeps_order() {
    let mut sink = CollectingSink::new();
    assert!(sink.is_empty());

    sink.report(&Error::new(ErrorImpl::InvalidAssignmentTarget, at(1, 1)));
    sink.report(&Error::new(
        ErrorImpl::UnexpectedToken {
            token: ")".to_string(),
        },
        at(2, 1),
    ));

    assert_eq!(sink.names(), vec!["InvalidAssignmentTarget", "UnexpectedToken"]);
    assert_eq!(sink.errors[1].get_position().line, 2);
}

#[test]
fn test_tracing_sink_counts_reports() {
    let mut sink = TracingSink::new();
    sink.report(&Error::new(ErrorImpl::InvalidAssignmentTarget, at(1, 1)));
    sink.report(&Error::new(ErrorImpl::InvalidAssignmentTarget, at(2, 1)));
    assert_eq!(sink.count, 2);
}
