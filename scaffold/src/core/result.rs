//! Uniform step result type.

use crate::errors::ScaffoldError;
use serde::Serialize;
use std::collections::HashMap;

/// The outcome of a provisioning step, or of the whole pipeline.
///
/// `StepResult` is immutable once created. A failed result always carries
/// an error description and a successful one never does; the factory
/// methods are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    success: bool,

    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    result: serde_json::Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StepResult {
    /// Creates a successful result with no payload.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            result: serde_json::Value::Null,
            error: None,
        }
    }

    /// Creates a successful result carrying a payload.
    #[must_use]
    pub fn ok_value(result: impl Into<serde_json::Value>) -> Self {
        Self {
            success: true,
            result: result.into(),
            error: None,
        }
    }

    /// Creates a successful result carrying a human-readable message.
    #[must_use]
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self::ok_value(serde_json::Value::String(message.into()))
    }

    /// Creates a failed result.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: serde_json::Value::Null,
            error: Some(error.into()),
        }
    }

    /// Creates a failed result that keeps whatever partial payload the
    /// step had gathered.
    #[must_use]
    pub fn fail_with(error: impl Into<String>, partial: impl Into<serde_json::Value>) -> Self {
        Self {
            success: false,
            result: partial.into(),
            error: Some(error.into()),
        }
    }

    /// Returns true if the step completed as intended.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns true if the step failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Returns the payload.
    #[must_use]
    pub fn result(&self) -> &serde_json::Value {
        &self.result
    }

    /// Returns the payload as a string, if it is one.
    #[must_use]
    pub fn result_str(&self) -> Option<&str> {
        self.result.as_str()
    }

    /// Returns the failure description.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Converts the result to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("success".to_string(), serde_json::json!(self.success));

        if !self.result.is_null() {
            map.insert("result".to_string(), self.result.clone());
        }

        if let Some(ref error) = self.error {
            map.insert("error".to_string(), serde_json::json!(error));
        }

        map
    }
}

impl From<&ScaffoldError> for StepResult {
    fn from(err: &ScaffoldError) -> Self {
        Self::fail(err.to_string())
    }
}

impl From<ScaffoldError> for StepResult {
    fn from(err: ScaffoldError) -> Self {
        Self::from(&err)
    }
}
