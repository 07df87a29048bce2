//! Project generation step.

use super::{ProvisionContext, Step};
use crate::core::StepResult;
use crate::errors::ScaffoldError;
use crate::process::ensure_success;
use crate::toolchain::DjangoAdmin;
use async_trait::async_trait;
use tracing::info;

/// Runs `startproject` with the resolved interpreter.
#[derive(Debug, Clone)]
pub struct GenerateProject {
    django: DjangoAdmin,
}

impl GenerateProject {
    /// Creates the step.
    #[must_use]
    pub fn new(django: DjangoAdmin) -> Self {
        Self { django }
    }
}

#[async_trait]
impl Step for GenerateProject {
    fn name(&self) -> &str {
        "generate_project"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let spec = self.django.startproject(
            ctx.require_interpreter()?,
            ctx.project_name(),
            ctx.layout().root(),
        );
        ctx.reporter()
            .progress(self.name(), format!("Creating project '{}'", ctx.project_name()));

        ensure_success(&spec, ctx.runner().run(&spec).await?)?;

        info!(project = %ctx.project_name(), root = %ctx.layout().root().display(), "Project generated");
        Ok(StepResult::ok_message(format!(
            "Created project '{}'",
            ctx.project_name()
        )))
    }
}
