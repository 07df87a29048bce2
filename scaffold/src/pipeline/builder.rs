//! Pipeline builder with validation.

use super::{FailurePolicy, Pipeline, StepSpec};
use crate::errors::ScaffoldError;
use crate::steps::{Step, TimeoutStep};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating validated pipelines.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    /// The pipeline name.
    name: String,
    /// Steps in execution order.
    steps: Vec<StepSpec>,
    /// Budget applied to every step.
    step_timeout: Option<Duration>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            step_timeout: None,
        }
    }

    /// Appends an aborting step.
    #[must_use]
    pub fn step(self, step: Arc<dyn Step>) -> Self {
        self.step_with_policy(step, FailurePolicy::Abort)
    }

    /// Appends a step with an explicit failure policy.
    #[must_use]
    pub fn step_with_policy(mut self, step: Arc<dyn Step>, policy: FailurePolicy) -> Self {
        self.steps.push(StepSpec::new(step).with_policy(policy));
        self
    }

    /// Wraps every step in a [`TimeoutStep`] when `timeout` is set.
    #[must_use]
    pub fn with_step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of steps added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no steps were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder has no steps or two steps share a name.
    pub fn build(self) -> Result<Pipeline, ScaffoldError> {
        if self.steps.is_empty() {
            return Err(ScaffoldError::Config(format!(
                "Pipeline '{}' has no steps",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for spec in &self.steps {
            if !seen.insert(spec.name()) {
                return Err(ScaffoldError::Config(format!(
                    "Pipeline '{}' has duplicate step '{}'",
                    self.name,
                    spec.name()
                )));
            }
        }

        let steps = match self.step_timeout {
            Some(timeout) => self
                .steps
                .into_iter()
                .map(|spec| {
                    let policy = spec.policy;
                    StepSpec::new(Arc::new(TimeoutStep::new(spec.step, timeout))).with_policy(policy)
                })
                .collect(),
            None => self.steps,
        };

        Ok(Pipeline::new(self.name, steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockStep;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_pipeline_is_rejected() {
        let err = PipelineBuilder::new("empty").build().unwrap_err();
        assert!(matches!(err, ScaffoldError::Config(_)));
    }

    #[test]
    fn test_duplicate_step_is_rejected() {
        let err = PipelineBuilder::new("dup")
            .step(Arc::new(MockStep::new("a")))
            .step(Arc::new(MockStep::new("a")))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate step 'a'"));
    }

    #[test]
    fn test_order_and_policies_are_kept() {
        let pipeline = PipelineBuilder::new("p")
            .step(Arc::new(MockStep::new("a")))
            .step_with_policy(Arc::new(MockStep::new("b")), FailurePolicy::Continue)
            .with_step_timeout(Some(Duration::from_secs(1)))
            .build()
            .unwrap();

        assert_eq!(pipeline.step_names(), vec!["a", "b"]);
        assert_eq!(
            pipeline.policies(),
            vec![FailurePolicy::Abort, FailurePolicy::Continue]
        );
    }
}
