//! Scripted command runner and mock steps.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::StepResult;
use crate::errors::ScaffoldError;
use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use crate::steps::{ProvisionContext, Step};

type Handler = Arc<dyn Fn(&CommandSpec) -> Result<CommandOutput, ScaffoldError> + Send + Sync>;

/// A command runner that records every invocation and answers from a script.
///
/// Rules match when the rendered command line contains their pattern. The
/// most recently added matching rule wins; unmatched commands succeed with
/// empty output.
#[derive(Default)]
pub struct ScriptedCommandRunner {
    rules: Mutex<Vec<(String, Handler)>>,
    delays: Mutex<Vec<(String, Duration)>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedCommandRunner {
    /// Creates a runner where every command succeeds silently.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers commands matching `pattern` with `output`.
    #[must_use]
    pub fn on(self, pattern: impl Into<String>, output: CommandOutput) -> Self {
        self.on_with(pattern, move |_| Ok(output.clone()))
    }

    /// Makes commands matching `pattern` fail to spawn.
    #[must_use]
    pub fn on_spawn_failure(self, pattern: impl Into<String>) -> Self {
        self.on_with(pattern, |spec| {
            Err(ScaffoldError::spawn(
                spec.program(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            ))
        })
    }

    /// Answers commands matching `pattern` with `handler`.
    #[must_use]
    pub fn on_with<F>(self, pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput, ScaffoldError> + Send + Sync + 'static,
    {
        self.rules.lock().push((pattern.into(), Arc::new(handler)));
        self
    }

    /// Makes commands matching `pattern` wait for `delay` before answering.
    ///
    /// The wait is a timer sleep, so a step timeout can cut it short.
    #[must_use]
    pub fn with_delay(self, pattern: impl Into<String>, delay: Duration) -> Self {
        self.delays.lock().push((pattern.into(), delay));
        self
    }

    /// Every command run so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// Rendered command lines, in order.
    #[must_use]
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.lock().iter().map(ToString::to_string).collect()
    }

    /// Index of the first command containing `pattern`.
    #[must_use]
    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.command_lines().iter().position(|line| line.contains(pattern))
    }

    /// Returns the number of commands run.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl fmt::Debug for ScriptedCommandRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns: Vec<String> = self.rules.lock().iter().map(|(p, _)| p.clone()).collect();
        f.debug_struct("ScriptedCommandRunner")
            .field("patterns", &patterns)
            .field("calls", &self.command_lines())
            .finish()
    }
}

#[async_trait]
impl CommandRunner for ScriptedCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ScaffoldError> {
        self.calls.lock().push(spec.clone());
        let line = spec.to_string();
        let handler = self
            .rules
            .lock()
            .iter()
            .rev()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, handler)| Arc::clone(handler));
        let delay = self
            .delays
            .lock()
            .iter()
            .rev()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, delay)| *delay);

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match handler {
            Some(handler) => handler(spec),
            None => Ok(CommandOutput::ok("")),
        }
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Result(StepResult),
    Error(String),
}

/// A step that records calls and returns a configured outcome.
#[derive(Debug)]
pub struct MockStep {
    name: String,
    outcome: Outcome,
    delay: Option<Duration>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
    call_count: Mutex<usize>,
}

impl MockStep {
    /// Creates a step that succeeds with no payload.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Result(StepResult::ok()),
            delay: None,
            journal: None,
            call_count: Mutex::new(0),
        }
    }

    /// Creates a step that reports a failure.
    #[must_use]
    pub fn failing(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(name).with_result(StepResult::fail(error))
    }

    /// Creates a step whose execution errors out.
    #[must_use]
    pub fn erroring(name: impl Into<String>, error: impl Into<String>) -> Self {
        let mut step = Self::new(name);
        step.outcome = Outcome::Error(error.into());
        step
    }

    /// Sets the result to return.
    #[must_use]
    pub fn with_result(mut self, result: StepResult) -> Self {
        self.outcome = Outcome::Result(result);
        self
    }

    /// Sleeps before returning.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Appends the step name to `journal` on each call.
    #[must_use]
    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Returns the number of times the step was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

#[async_trait]
impl Step for MockStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        *self.call_count.lock() += 1;
        if let Some(journal) = &self.journal {
            journal.lock().push(self.name.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.outcome {
            Outcome::Result(result) => Ok(result.clone()),
            Outcome::Error(message) => Err(ScaffoldError::io(
                &self.name,
                std::io::Error::other(message.clone()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_latest_rule_wins() {
        let runner = ScriptedCommandRunner::new()
            .on("pipenv", CommandOutput::failed(2, "first"))
            .on("pipenv --venv", CommandOutput::ok("/venv"));

        let venv = runner.run(&CommandSpec::new("pipenv").arg("--venv")).await.unwrap();
        let install = runner.run(&CommandSpec::new("pipenv").arg("install")).await.unwrap();
        let other = runner.run(&CommandSpec::new("git").arg("init")).await.unwrap();

        assert_eq!(venv.stdout, "/venv");
        assert_eq!(install.code, Some(2));
        assert!(other.success());
        assert_eq!(
            runner.command_lines(),
            vec!["pipenv --venv", "pipenv install", "git init"]
        );
        assert_eq!(runner.position("install"), Some(1));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let runner = ScriptedCommandRunner::new().on_spawn_failure("python3");
        let err = runner.run(&CommandSpec::new("/venv/bin/python3")).await.unwrap_err();
        assert!(matches!(err, ScaffoldError::CommandSpawn { .. }));
        assert_eq!(runner.call_count(), 1);
    }
}
