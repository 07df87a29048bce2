//! Invariant tests for StepResult.

use crate::core::StepResult;
use crate::errors::ScaffoldError;

fn all_constructors() -> Vec<StepResult> {
    vec![
        StepResult::ok(),
        StepResult::ok_value(serde_json::json!({"path": "/tmp/venv"})),
        StepResult::ok_message("Templates copied"),
        StepResult::fail("install failed"),
        StepResult::fail_with("install failed", serde_json::json!({"stdout": "..."})),
        StepResult::from(ScaffoldError::Config("empty pipeline".to_string())),
    ]
}

#[test]
fn test_failure_always_has_error() {
    for result in all_constructors() {
        if result.is_failure() {
            assert!(result.error().is_some(), "failed result without error: {result:?}");
        }
    }
}

#[test]
fn test_success_never_has_error() {
    for result in all_constructors() {
        if result.is_success() {
            assert!(result.error().is_none(), "successful result with error: {result:?}");
        }
    }
}

#[test]
fn test_fail_with_keeps_partial_payload() {
    let result = StepResult::fail_with("exit 2", serde_json::json!({"stdout": "partial"}));
    assert_eq!(result.result()["stdout"], "partial");
    assert_eq!(result.error(), Some("exit 2"));
}

#[test]
fn test_to_dict() {
    let dict = StepResult::fail("error").to_dict();
    assert_eq!(dict.get("success"), Some(&serde_json::json!(false)));
    assert_eq!(dict.get("error"), Some(&serde_json::json!("error")));
    assert!(!dict.contains_key("result"));

    let dict = StepResult::ok_value("/srv/venv").to_dict();
    assert_eq!(dict.get("result"), Some(&serde_json::json!("/srv/venv")));
    assert!(!dict.contains_key("error"));
}

#[test]
fn test_clone_is_equal() {
    let result = StepResult::fail_with("boom", "partial");
    assert_eq!(result.clone(), result);
}
