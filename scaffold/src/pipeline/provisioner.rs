//! The Django provisioning pipeline.

use super::{FailurePolicy, Pipeline, PipelineBuilder, PipelineReport};
use crate::config::{ScaffoldConfig, ScaffoldOptions};
use crate::core::{Platform, StepResult};
use crate::errors::ScaffoldError;
use crate::events::{EventSink, LoggingEventSink, Reporter};
use crate::process::{CommandRunner, SystemCommandRunner};
use crate::steps::{
    BootstrapEnvironment, CopyTemplates, CreateStaticDir, FixPermissions, GenerateProject,
    InstallDependencies, OverwriteDefaults, ProvisionContext, RemoveStockSettings,
    RenameIgnoreFile, ResolveInterpreter, ResolveVirtualenv, RewriteBaseSettings, WriteSecret,
};
use crate::toolchain::validate_project_name;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Name of the provisioning pipeline.
pub const PIPELINE_NAME: &str = "django-provision";

/// Provisions a Django project skeleton into an existing directory.
///
/// # Example
///
/// ```rust,ignore
/// let result = Provisioner::new(ScaffoldConfig::default())
///     .run(&ScaffoldOptions::new("blog"), Path::new("/srv/blog"))
///     .await;
/// assert!(result.is_success());
/// ```
#[derive(Clone)]
pub struct Provisioner {
    config: ScaffoldConfig,
    runner: Arc<dyn CommandRunner>,
    sink: Arc<dyn EventSink>,
    platform: Platform,
}

impl Provisioner {
    /// Creates a provisioner that runs real commands and logs events.
    #[must_use]
    pub fn new(config: ScaffoldConfig) -> Self {
        Self {
            config,
            runner: Arc::new(SystemCommandRunner::new()),
            sink: Arc::new(LoggingEventSink::default()),
            platform: Platform::current(),
        }
    }

    /// Sets the command runner.
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the platform used for interpreter resolution.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ScaffoldConfig {
        &self.config
    }

    /// Assembles the steps in their fixed order.
    pub fn build_pipeline(&self) -> Result<Pipeline, ScaffoldError> {
        let pipenv = self.config.pipenv();
        let finishing = if self.config.best_effort_finishing {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        };

        PipelineBuilder::new(PIPELINE_NAME)
            .step(Arc::new(BootstrapEnvironment::new(pipenv.clone())))
            .step(Arc::new(InstallDependencies::new(pipenv.clone())))
            .step(Arc::new(ResolveVirtualenv::new(pipenv)))
            .step(Arc::new(ResolveInterpreter))
            .step(Arc::new(GenerateProject::new(self.config.django_admin())))
            .step(Arc::new(CopyTemplates))
            .step(Arc::new(WriteSecret))
            .step_with_policy(Arc::new(RewriteBaseSettings), finishing)
            .step(Arc::new(RemoveStockSettings))
            .step_with_policy(Arc::new(RenameIgnoreFile), finishing)
            .step_with_policy(Arc::new(OverwriteDefaults), finishing)
            .step_with_policy(Arc::new(FixPermissions), finishing)
            .step_with_policy(Arc::new(CreateStaticDir), finishing)
            .with_step_timeout(self.config.step_timeout())
            .build()
    }

    /// Provisions the project and returns the overall result.
    pub async fn run(&self, options: &ScaffoldOptions, destination: &Path) -> StepResult {
        self.run_with_report(options, destination).await.outcome
    }

    /// Provisions the project and returns the full run report.
    pub async fn run_with_report(
        &self,
        options: &ScaffoldOptions,
        destination: &Path,
    ) -> PipelineReport {
        let reporter = Reporter::new(Arc::clone(&self.sink), options.verbose_logs);

        let pipeline = match self
            .preflight(options, destination)
            .await
            .and_then(|()| self.build_pipeline())
        {
            Ok(pipeline) => pipeline,
            Err(err) => {
                warn!(project = %options.project_name, error = %err, "Provisioning rejected");
                reporter.error("preflight", err.to_string());
                return PipelineReport::rejected(PIPELINE_NAME, StepResult::from(&err));
            }
        };

        info!(
            project = %options.project_name,
            destination = %destination.display(),
            platform = %self.platform,
            "Provisioning project"
        );

        let mut ctx = ProvisionContext::new(options.clone(), destination, Arc::clone(&self.runner))
            .with_platform(self.platform)
            .with_templates(self.config.template_source())
            .with_reporter(reporter);

        pipeline.run(&mut ctx).await
    }

    async fn preflight(
        &self,
        options: &ScaffoldOptions,
        destination: &Path,
    ) -> Result<(), ScaffoldError> {
        self.config.validate()?;
        validate_project_name(&options.project_name)?;

        let metadata = tokio::fs::metadata(destination)
            .await
            .map_err(|e| ScaffoldError::invalid_destination(destination, e.to_string()))?;
        if !metadata.is_dir() {
            return Err(ScaffoldError::invalid_destination(
                destination,
                "not a directory",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

/// Provisions `options.project_name` into `destination` with the default
/// configuration and the real toolchain.
pub async fn provision(options: &ScaffoldOptions, destination: &Path) -> StepResult {
    Provisioner::new(ScaffoldConfig::default())
        .run(options, destination)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::testing::{assert_error_contains, ScriptedCommandRunner};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_step_order() {
        let pipeline = Provisioner::new(ScaffoldConfig::default()).build_pipeline().unwrap();
        assert_eq!(
            pipeline.step_names(),
            vec![
                "bootstrap_environment",
                "install_dependencies",
                "resolve_virtualenv",
                "resolve_interpreter",
                "generate_project",
                "copy_templates",
                "write_secret",
                "rewrite_base_settings",
                "remove_stock_settings",
                "rename_ignore_file",
                "overwrite_defaults",
                "fix_permissions",
                "create_static_dir",
            ]
        );
        assert!(pipeline.policies().iter().all(|p| *p == FailurePolicy::Abort));
    }

    #[test]
    fn test_best_effort_only_relaxes_finishing_steps() {
        let config = ScaffoldConfig::default().with_best_effort_finishing(true);
        let pipeline = Provisioner::new(config).build_pipeline().unwrap();

        let continuing: Vec<&str> = pipeline
            .step_names()
            .into_iter()
            .zip(pipeline.policies())
            .filter(|(_, p)| *p == FailurePolicy::Continue)
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            continuing,
            vec![
                "rewrite_base_settings",
                "rename_ignore_file",
                "overwrite_defaults",
                "fix_permissions",
                "create_static_dir",
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_name_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedCommandRunner::new());
        let sink = Arc::new(CollectingEventSink::new());
        let provisioner = Provisioner::new(ScaffoldConfig::default())
            .with_runner(runner.clone())
            .with_sink(sink.clone());

        let result = provisioner
            .run(&ScaffoldOptions::new("my-site"), dir.path())
            .await;

        assert_error_contains(&result, "my-site");
        assert_eq!(runner.call_count(), 0);
        assert!(sink.events_of_type("pipeline.").is_empty());
    }

    #[tokio::test]
    async fn test_missing_destination_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedCommandRunner::new());
        let provisioner = Provisioner::new(ScaffoldConfig::default()).with_runner(runner.clone());

        let result = provisioner
            .run(&ScaffoldOptions::new("blog"), &dir.path().join("missing"))
            .await;

        assert_error_contains(&result, "Invalid destination");
        assert_eq!(runner.call_count(), 0);
    }
}
