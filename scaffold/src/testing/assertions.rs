//! Test assertions for step results.

use crate::core::StepResult;

/// Asserts that the result indicates success.
pub fn assert_step_succeeded(result: &StepResult) {
    assert!(
        result.is_success(),
        "Expected success, got error: {:?}",
        result.error()
    );
}

/// Asserts that the result indicates failure.
pub fn assert_step_failed(result: &StepResult) {
    assert!(
        result.is_failure(),
        "Expected failure, got result: {}",
        result.result()
    );
}

/// Asserts that the result failed with an error containing `needle`.
pub fn assert_error_contains(result: &StepResult, needle: &str) {
    assert_step_failed(result);
    let error = result.error().unwrap_or_default();
    assert!(
        error.contains(needle),
        "Expected error containing '{needle}', got '{error}'"
    );
}
