//! Error type tests
//!
//! Tests for CfError messages, diagnostic codes and conversions.

#![allow(clippy::expect_used)]

use crate::error::CfError;
use miette::Diagnostic;

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_display() {
    let err = CfError::ModuleNotFound {
        name: "delete-files@0.0.1".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Module 'delete-files@0.0.1' not found in index"
    );
}

#[test]
fn test_error_code() {
    let err = CfError::Busy {
        path: "/tmp/project".to_string(),
    };
    assert_eq!(
        err.code()
            .map(|c: Box<dyn std::fmt::Display>| c.to_string()),
        Some("cfbuild::transaction::busy".to_string())
    );
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: CfError = io_err.into();
    assert!(matches!(err, CfError::IoError { .. }));
}

#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
    let err: CfError = json_err.into();
    assert!(matches!(err, CfError::ConfigInvalid { .. }));
}

#[test]
fn test_validation_shorthand() {
    let err = CfError::validation("files", "expected an array");
    assert!(matches!(
        err,
        CfError::Validation { ref field, ref reason } if field == "files" && reason == "expected an array"
    ));
}

test_error_contains!(
    test_cycle_message_shows_path,
    CfError::CyclicDependency {
        path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
    },
    "a -> b -> a"
);

test_error_contains!(
    test_version_conflict_message,
    CfError::VersionConflict {
        name: "autorun".to_string(),
        first: "1.0.0".to_string(),
        second: "1.0.1".to_string(),
    },
    "autorun",
    "1.0.0",
    "1.0.1"
);

test_error_contains!(
    test_module_in_use_lists_dependents,
    CfError::ModuleInUse {
        name: "autorun".to_string(),
        dependents: vec!["delete-files".to_string(), "promote".to_string()],
    },
    "autorun",
    "delete-files, promote"
);

test_error_contains!(
    test_unresolved_variable_message,
    CfError::UnresolvedVariable {
        module: "motd".to_string(),
        variable: "greeting".to_string(),
    },
    "greeting",
    "motd"
);
