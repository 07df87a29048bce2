//! Run options and toolchain configuration.

use crate::errors::ScaffoldError;
use crate::templates::TemplateSource;
use crate::toolchain::{DjangoAdmin, Pipenv};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-run options supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldOptions {
    /// Name of the project, used as the Python package name.
    pub project_name: String,
    /// Whether progress messages are reported.
    #[serde(default)]
    pub verbose_logs: bool,
}

impl ScaffoldOptions {
    /// Creates quiet options for `project_name`.
    #[must_use]
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            verbose_logs: false,
        }
    }

    /// Sets verbosity.
    #[must_use]
    pub fn with_verbose_logs(mut self, verbose: bool) -> Self {
        self.verbose_logs = verbose;
        self
    }
}

/// Toolchain configuration shared by every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    /// The pipenv executable.
    #[serde(default = "default_pipenv_program")]
    pub pipenv_program: String,
    /// Packages passed to `pipenv install`.
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
    /// Module run with `python -m` to create the project.
    #[serde(default = "default_framework_module")]
    pub framework_module: String,
    /// Directory overriding the compiled-in templates.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    /// Time budget per step in seconds. Unlimited when unset.
    #[serde(default)]
    pub step_timeout_secs: Option<f64>,
    /// Log and skip failures of the finishing steps instead of aborting.
    #[serde(default)]
    pub best_effort_finishing: bool,
}

fn default_pipenv_program() -> String {
    "pipenv".to_string()
}

fn default_packages() -> Vec<String> {
    vec!["django".to_string()]
}

fn default_framework_module() -> String {
    "django".to_string()
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            pipenv_program: default_pipenv_program(),
            packages: default_packages(),
            framework_module: default_framework_module(),
            template_dir: None,
            step_timeout_secs: None,
            best_effort_finishing: false,
        }
    }
}

impl ScaffoldConfig {
    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ScaffoldError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ScaffoldError::io(path, e))?;
        serde_json::from_str(&raw)
            .map_err(|e| ScaffoldError::Config(format!("{}: {e}", path.display())))
    }

    /// Defaults overridden by `SCAFFOLD_*` environment variables.
    pub fn from_env() -> Result<Self, ScaffoldError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`.
    ///
    /// Recognised keys: `SCAFFOLD_PIPENV`, `SCAFFOLD_PACKAGES`
    /// (comma-separated), `SCAFFOLD_FRAMEWORK_MODULE`,
    /// `SCAFFOLD_TEMPLATE_DIR`, `SCAFFOLD_STEP_TIMEOUT_SECS`,
    /// `SCAFFOLD_BEST_EFFORT`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ScaffoldError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(program) = lookup("SCAFFOLD_PIPENV") {
            self.pipenv_program = program;
        }
        if let Some(packages) = lookup("SCAFFOLD_PACKAGES") {
            self.packages = packages
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(module) = lookup("SCAFFOLD_FRAMEWORK_MODULE") {
            self.framework_module = module;
        }
        if let Some(dir) = lookup("SCAFFOLD_TEMPLATE_DIR") {
            self.template_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup("SCAFFOLD_STEP_TIMEOUT_SECS") {
            let seconds: f64 = raw.trim().parse().map_err(|_| {
                ScaffoldError::Config(format!("SCAFFOLD_STEP_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            self.step_timeout_secs = Some(seconds);
        }
        if let Some(raw) = lookup("SCAFFOLD_BEST_EFFORT") {
            self.best_effort_finishing = parse_flag(&raw);
        }
        self.validate()?;
        Ok(self)
    }

    /// Sets the packages to install.
    #[must_use]
    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages = packages.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the per-step timeout.
    #[must_use]
    pub fn with_step_timeout(mut self, seconds: f64) -> Self {
        self.step_timeout_secs = Some(seconds);
        self
    }

    /// Sets the template directory.
    #[must_use]
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    /// Sets best-effort handling of the finishing steps.
    #[must_use]
    pub fn with_best_effort_finishing(mut self, enabled: bool) -> Self {
        self.best_effort_finishing = enabled;
        self
    }

    /// Checks field values.
    pub fn validate(&self) -> Result<(), ScaffoldError> {
        if self.pipenv_program.trim().is_empty() {
            return Err(ScaffoldError::Config("pipenv_program is empty".to_string()));
        }
        if self.framework_module.trim().is_empty() {
            return Err(ScaffoldError::Config("framework_module is empty".to_string()));
        }
        if let Some(seconds) = self.step_timeout_secs {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(ScaffoldError::Config(format!(
                    "step_timeout_secs must be positive, got {seconds}"
                )));
            }
            Duration::try_from_secs_f64(seconds).map_err(|e| {
                ScaffoldError::Config(format!("step_timeout_secs is out of range, got {seconds}: {e}"))
            })?;
        }
        Ok(())
    }

    /// Per-step timeout as a Duration. `None` when unset or not
    /// representable; [`validate`](Self::validate) rejects the latter.
    #[must_use]
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs
            .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
    }

    /// The pipenv command builder.
    #[must_use]
    pub fn pipenv(&self) -> Pipenv {
        Pipenv::new(&self.pipenv_program, self.packages.clone())
    }

    /// The project generator command builder.
    #[must_use]
    pub fn django_admin(&self) -> DjangoAdmin {
        DjangoAdmin::new(&self.framework_module)
    }

    /// Where templates are read from.
    #[must_use]
    pub fn template_source(&self) -> TemplateSource {
        self.template_dir
            .clone()
            .map_or(TemplateSource::Embedded, TemplateSource::Directory)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
