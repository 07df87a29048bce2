//! Step specifications.

use crate::steps::Step;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What the pipeline does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the pipeline and return the failed result (default).
    #[default]
    Abort,
    /// Record the failure and run the next step.
    Continue,
}

/// A step together with its failure policy.
#[derive(Debug, Clone)]
pub struct StepSpec {
    /// The step implementation.
    pub step: Arc<dyn Step>,
    /// How a failure of this step is handled.
    pub policy: FailurePolicy,
}

impl StepSpec {
    /// Creates an aborting step specification.
    #[must_use]
    pub fn new(step: Arc<dyn Step>) -> Self {
        Self {
            step,
            policy: FailurePolicy::Abort,
        }
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The step name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.step.name()
    }
}
