//! Time-budget decorator for steps.

use super::{ProvisionContext, Step};
use crate::core::StepResult;
use crate::errors::ScaffoldError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Wraps a step so it fails with [`ScaffoldError::Timeout`] once its
/// budget runs out. The inner future is dropped, which kills any child
/// process it spawned.
#[derive(Debug, Clone)]
pub struct TimeoutStep {
    inner: Arc<dyn Step>,
    timeout: Duration,
}

impl TimeoutStep {
    /// Wraps `inner` with `timeout`.
    #[must_use]
    pub fn new(inner: Arc<dyn Step>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The budget.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Step for TimeoutStep {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        if let Ok(result) = tokio::time::timeout(self.timeout, self.inner.execute(ctx)).await {
            result
        } else {
            let seconds = self.timeout.as_secs_f64();
            warn!(step = %self.name(), timeout_secs = seconds, "Step timed out");
            Err(ScaffoldError::timeout(self.name(), seconds))
        }
    }
}
