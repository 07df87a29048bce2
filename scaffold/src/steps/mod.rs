//! Step trait, the per-run context, and the provisioning steps.
//!
//! Every step reports through the same channel: `Ok(StepResult)` for a
//! result the step decided on, `Err(ScaffoldError)` for anything that
//! went wrong underneath it. The pipeline driver treats both uniformly.

mod environment;
mod files;
mod project;
mod timeout;

pub use environment::{
    BootstrapEnvironment, InstallDependencies, ResolveInterpreter, ResolveVirtualenv,
    BOOTSTRAP_FAILURE,
};
pub use files::{
    CopyTemplates, CreateStaticDir, FixPermissions, OverwriteDefaults, RemoveStockSettings,
    RenameIgnoreFile, RewriteBaseSettings, WriteSecret,
};
pub use project::GenerateProject;
pub use timeout::TimeoutStep;

use crate::config::ScaffoldOptions;
use crate::core::{Platform, ProjectLayout, StepResult};
use crate::errors::ScaffoldError;
use crate::events::Reporter;
use crate::process::CommandRunner;
use crate::templates::TemplateSource;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Trait for provisioning steps.
#[async_trait]
pub trait Step: Send + Sync + Debug {
    /// Returns the name of the step.
    fn name(&self) -> &str;

    /// Executes the step.
    ///
    /// # Returns
    ///
    /// `Ok` with the step's own verdict (which may be a failure), or `Err`
    /// when an operation the step relies on failed.
    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError>;
}

/// State threaded through one pipeline run.
pub struct ProvisionContext {
    options: ScaffoldOptions,
    layout: ProjectLayout,
    platform: Platform,
    runner: Arc<dyn CommandRunner>,
    templates: TemplateSource,
    reporter: Reporter,
    venv_path: Option<PathBuf>,
    interpreter: Option<PathBuf>,
}

impl ProvisionContext {
    /// Creates a context for provisioning into `destination`.
    #[must_use]
    pub fn new(
        options: ScaffoldOptions,
        destination: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let layout = ProjectLayout::new(destination, options.project_name.clone());
        Self {
            options,
            layout,
            platform: Platform::current(),
            runner,
            templates: TemplateSource::Embedded,
            reporter: Reporter::silent(),
            venv_path: None,
            interpreter: None,
        }
    }

    /// Sets the platform used for interpreter resolution.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the template source.
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateSource) -> Self {
        self.templates = templates;
        self
    }

    /// Sets the progress reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// The project name.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.options.project_name
    }

    /// The destination layout.
    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// The target platform.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The command runner.
    #[must_use]
    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// The template source.
    #[must_use]
    pub fn templates(&self) -> &TemplateSource {
        &self.templates
    }

    /// The progress reporter.
    #[must_use]
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// The resolved virtual environment root, if known.
    #[must_use]
    pub fn venv_path(&self) -> Option<&Path> {
        self.venv_path.as_deref()
    }

    /// The resolved interpreter, if known.
    #[must_use]
    pub fn interpreter(&self) -> Option<&Path> {
        self.interpreter.as_deref()
    }

    /// Records the virtual environment root.
    pub fn set_venv_path(&mut self, path: PathBuf) {
        self.venv_path = Some(path);
    }

    /// Records the interpreter path.
    pub fn set_interpreter(&mut self, path: PathBuf) {
        self.interpreter = Some(path);
    }

    /// The virtual environment root, or an error if unresolved.
    pub fn require_venv(&self) -> Result<&Path, ScaffoldError> {
        self.venv_path().ok_or(ScaffoldError::MissingState("virtual environment path"))
    }

    /// The interpreter, or an error if unresolved.
    pub fn require_interpreter(&self) -> Result<&Path, ScaffoldError> {
        self.interpreter().ok_or(ScaffoldError::MissingState("interpreter path"))
    }
}

impl Debug for ProvisionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionContext")
            .field("options", &self.options)
            .field("layout", &self.layout)
            .field("platform", &self.platform)
            .field("templates", &self.templates)
            .field("venv_path", &self.venv_path)
            .field("interpreter", &self.interpreter)
            .finish_non_exhaustive()
    }
}
