//! Unit tests for error handling.
//!
//! This module contains tests for error types and the diagnostic reporter.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::errors::reporter::{Reporter, Severity};
use crate::Position;
use std::rc::Rc;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position(10, Rc::new("test.elz".to_string())),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 10);
}

#[test]
fn test_unrecognised_token_has_no_tip() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position::null(),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_unsupported_operator_error() {
    let error = Error::codegen(ErrorImpl::UnsupportedOperator {
        operator: "^".to_string(),
        type_: "i32".to_string(),
    });

    assert_eq!(error.get_error_name(), "UnsupportedOperator");
    assert_eq!(error.to_string(), "unsupported operator `^` for type: i32");
    assert_eq!(
        error.get_tip().to_string(),
        "Operator `^` has no lowering for operands of type `i32`"
    );
}

#[test]
fn test_unsized_type_error() {
    let error = Error::codegen(ErrorImpl::UnsizedType {
        type_: "Show".to_string(),
    });

    assert_eq!(error.get_error_name(), "UnsizedType");
    assert_eq!(error.get_position().1.as_str(), "<null>");
}

#[test]
fn test_unexpected_token_detailed_tip() {
    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: "}".to_string(),
            message: "expected `=`".to_string(),
        },
        Position(3, Rc::new("test.elz".to_string())),
    );

    assert_eq!(
        error.get_tip().to_string(),
        "Unexpected token: `}`, expected `=`"
    );
}

#[test]
fn test_reporter_preserves_order_and_duplicates() {
    let mut reporter = Reporter::new();
    reporter.emit("expression miss error");
    reporter.emit("undefined identifier: y");
    reporter.emit("expression miss error");

    assert_eq!(
        reporter.messages(),
        vec![
            "expression miss error",
            "undefined identifier: y",
            "expression miss error"
        ]
    );
    assert_eq!(reporter.len(), 3);
    assert!(!reporter.has_fatal());
}

#[test]
fn test_reporter_fatal() {
    let mut reporter = Reporter::new();
    assert!(reporter.is_empty());

    reporter.emit("duplicate definition: x");
    reporter.fatal("unsupported operator `^` for type: i32");

    assert!(reporter.has_fatal());
    assert_eq!(reporter.all()[0].severity, Severity::Recoverable);
    assert_eq!(reporter.all()[1].severity, Severity::Fatal);
    assert_eq!(
        reporter.all()[1].to_string(),
        "fatal: unsupported operator `^` for type: i32"
    );
}
