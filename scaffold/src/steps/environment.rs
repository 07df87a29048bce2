//! Environment steps: bootstrap, install, venv and interpreter resolution.

use super::{ProvisionContext, Step};
use crate::core::{interpreter_path, StepResult};
use crate::errors::ScaffoldError;
use crate::process::ensure_success;
use crate::toolchain::Pipenv;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// Error reported when the environment shell cannot be started.
pub const BOOTSTRAP_FAILURE: &str = "Failed to start the virtual environment shell";

/// Starts pipenv's environment subshell so the virtualenv exists.
#[derive(Debug, Clone)]
pub struct BootstrapEnvironment {
    pipenv: Pipenv,
}

impl BootstrapEnvironment {
    /// Creates the step.
    #[must_use]
    pub fn new(pipenv: Pipenv) -> Self {
        Self { pipenv }
    }
}

#[async_trait]
impl Step for BootstrapEnvironment {
    fn name(&self) -> &str {
        "bootstrap_environment"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let spec = self.pipenv.shell(ctx.layout().root());
        ctx.reporter().progress(self.name(), "Starting virtual environment shell");

        let output = match ctx.runner().run(&spec).await {
            Ok(output) => output,
            Err(err) => {
                return Ok(StepResult::fail_with(
                    BOOTSTRAP_FAILURE,
                    serde_json::json!({ "cause": err.to_string() }),
                ));
            }
        };

        if !output.success() {
            return Ok(StepResult::fail_with(
                BOOTSTRAP_FAILURE,
                serde_json::json!({
                    "code": output.code,
                    "output": output.diagnostic(),
                }),
            ));
        }

        Ok(StepResult::ok_message("Virtual environment shell started"))
    }
}

/// Installs the configured packages with pipenv.
#[derive(Debug, Clone)]
pub struct InstallDependencies {
    pipenv: Pipenv,
}

impl InstallDependencies {
    /// Creates the step.
    #[must_use]
    pub fn new(pipenv: Pipenv) -> Self {
        Self { pipenv }
    }
}

#[async_trait]
impl Step for InstallDependencies {
    fn name(&self) -> &str {
        "install_dependencies"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let spec = self.pipenv.install(ctx.layout().root());
        ctx.reporter().progress(
            self.name(),
            format!("Installing {}", self.pipenv.packages().join(", ")),
        );

        let output = ctx.runner().run(&spec).await?;
        if !output.success() {
            let err = ScaffoldError::command_failed(spec.to_string(), output.code, output.diagnostic());
            let result = StepResult::fail_with(
                err.to_string(),
                serde_json::json!({ "stdout": output.stdout_trimmed() }),
            );
            ctx.reporter()
                .error(self.name(), serde_json::json!(result.to_dict()).to_string());
            return Ok(result);
        }

        ctx.reporter().success(self.name(), "Dependencies installed");
        Ok(StepResult::ok_value(output.stdout_trimmed()))
    }
}

/// Asks pipenv where the environment lives.
#[derive(Debug, Clone)]
pub struct ResolveVirtualenv {
    pipenv: Pipenv,
}

impl ResolveVirtualenv {
    /// Creates the step.
    #[must_use]
    pub fn new(pipenv: Pipenv) -> Self {
        Self { pipenv }
    }
}

#[async_trait]
impl Step for ResolveVirtualenv {
    fn name(&self) -> &str {
        "resolve_virtualenv"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let spec = self.pipenv.venv(ctx.layout().root());
        let output = ensure_success(&spec, ctx.runner().run(&spec).await?)?;

        // pipenv may print warnings ahead of the path.
        let Some(venv) = output
            .stdout_trimmed()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
        else {
            return Err(ScaffoldError::EmptyOutput {
                command: spec.to_string(),
            });
        };

        info!(venv = %venv, "Resolved virtual environment");
        ctx.reporter()
            .progress(self.name(), format!("Virtual environment located at {venv}"));

        let result = StepResult::ok_value(venv);
        ctx.set_venv_path(PathBuf::from(venv));
        Ok(result)
    }
}

/// Derives the interpreter path from the resolved environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveInterpreter;

#[async_trait]
impl Step for ResolveInterpreter {
    fn name(&self) -> &str {
        "resolve_interpreter"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let interpreter = interpreter_path(ctx.require_venv()?, ctx.platform());
        debug!(interpreter = %interpreter.display(), platform = %ctx.platform(), "Resolved interpreter");

        let result = StepResult::ok_value(interpreter.display().to_string());
        ctx.set_interpreter(interpreter);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaffoldOptions;
    use crate::core::Platform;
    use crate::process::{CommandOutput, MockCommandRunner};
    use std::path::Path;
    use std::sync::Arc;

    fn context(runner: MockCommandRunner) -> ProvisionContext {
        ProvisionContext::new(ScaffoldOptions::new("blog"), "/srv/app", Arc::new(runner))
    }

    #[tokio::test]
    async fn test_bootstrap_failure_uses_fixed_message() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_| Ok(CommandOutput::failed(1, "pipenv: command not found")));

        let mut ctx = context(runner);
        let result = BootstrapEnvironment::new(Pipenv::default())
            .execute(&mut ctx)
            .await
            .unwrap();

        assert!(result.is_failure());
        assert_eq!(result.error(), Some(BOOTSTRAP_FAILURE));
        assert_eq!(result.result()["code"], 1);
    }

    #[tokio::test]
    async fn test_bootstrap_spawn_error_is_captured() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|spec| {
            Err(ScaffoldError::spawn(
                spec.program(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            ))
        });

        let mut ctx = context(runner);
        let result = BootstrapEnvironment::new(Pipenv::default())
            .execute(&mut ctx)
            .await
            .unwrap();

        assert_eq!(result.error(), Some(BOOTSTRAP_FAILURE));
    }

    #[tokio::test]
    async fn test_install_failure_is_reported_not_raised() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|spec| spec.to_string() == "pipenv install django")
            .times(1)
            .returning(|_| Ok(CommandOutput::failed(1, "ResolutionFailure")));

        let mut ctx = context(runner);
        let result = InstallDependencies::new(Pipenv::default())
            .execute(&mut ctx)
            .await
            .unwrap();

        assert!(result.is_failure());
        assert!(result.error().unwrap().contains("ResolutionFailure"));
    }

    #[tokio::test]
    async fn test_resolve_virtualenv_takes_last_line() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Ok(CommandOutput::ok(
                "Courtesy Notice: Pipenv found itself running within a virtual environment\n/home/dev/.venvs/app-Xy12\n",
            ))
        });

        let mut ctx = context(runner);
        let result = ResolveVirtualenv::new(Pipenv::default())
            .execute(&mut ctx)
            .await
            .unwrap();

        assert_eq!(result.result_str(), Some("/home/dev/.venvs/app-Xy12"));
        assert_eq!(ctx.venv_path(), Some(Path::new("/home/dev/.venvs/app-Xy12")));
    }

    #[tokio::test]
    async fn test_resolve_virtualenv_empty_output() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| Ok(CommandOutput::ok("  \n")));

        let mut ctx = context(runner);
        let err = ResolveVirtualenv::new(Pipenv::default())
            .execute(&mut ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ScaffoldError::EmptyOutput { .. }));
        assert!(ctx.venv_path().is_none());
    }

    #[tokio::test]
    async fn test_resolve_interpreter() {
        let runner = MockCommandRunner::new();
        let mut ctx = context(runner).with_platform(Platform::Unix);

        let err = ResolveInterpreter.execute(&mut ctx).await.unwrap_err();
        assert!(matches!(err, ScaffoldError::MissingState(_)));

        ctx.set_venv_path(PathBuf::from("/venv"));
        let result = ResolveInterpreter.execute(&mut ctx).await.unwrap();
        assert!(result.is_success());
        assert_eq!(ctx.interpreter(), Some(Path::new("/venv/bin/python3")));
    }
}
