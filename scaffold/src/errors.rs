//! Error types for the provisioning pipeline.
//!
//! Every external call a step makes (child processes, filesystem
//! operations, template loading) reports failure through
//! [`ScaffoldError`]. The pipeline driver turns these into failed
//! [`StepResult`](crate::core::StepResult) values.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for scaffold operations.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// The project name cannot be used as a Python package.
    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The destination directory is missing or unusable.
    #[error("Invalid destination '{}': {reason}", path.display())]
    InvalidDestination {
        /// The destination path.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// A child process could not be started.
    #[error("Failed to spawn '{program}': {source}")]
    CommandSpawn {
        /// The program that failed to start.
        program: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A child process exited unsuccessfully.
    #[error("Command '{command}' exited with {}: {stderr}", exit_label(.code))]
    CommandFailed {
        /// The full command line.
        command: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Trimmed diagnostic output of the process.
        stderr: String,
    },

    /// A command that must print something printed nothing.
    #[error("Command '{command}' produced no output")]
    EmptyOutput {
        /// The full command line.
        command: String,
    },

    /// A filesystem operation failed.
    #[error("IO error at '{}': {source}", path.display())]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A step exceeded its time budget.
    #[error("Step '{step}' timed out after {seconds}s")]
    Timeout {
        /// The step name.
        step: String,
        /// The budget in seconds.
        seconds: f64,
    },

    /// A step ran before the state it depends on was produced.
    #[error("Missing pipeline state: {0}")]
    MissingState(&'static str),

    /// A template could not be loaded or rendered.
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid configuration or pipeline assembly.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| format!("status {c}"))
}

impl ScaffoldError {
    /// Creates an invalid project name error.
    #[must_use]
    pub fn invalid_project_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProjectName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid destination error.
    #[must_use]
    pub fn invalid_destination(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDestination {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a spawn error.
    #[must_use]
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandSpawn {
            program: program.into(),
            source,
        }
    }

    /// Creates a command failure error.
    #[must_use]
    pub fn command_failed(
        command: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Creates a filesystem error bound to a path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(step: impl Into<String>, seconds: f64) -> Self {
        Self::Timeout {
            step: step.into(),
            seconds,
        }
    }

    /// Returns a short, stable name for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidProjectName { .. } => "InvalidProjectName",
            Self::InvalidDestination { .. } => "InvalidDestination",
            Self::CommandSpawn { .. } => "CommandSpawn",
            Self::CommandFailed { .. } => "CommandFailed",
            Self::EmptyOutput { .. } => "EmptyOutput",
            Self::Io { .. } => "Io",
            Self::Timeout { .. } => "Timeout",
            Self::MissingState(_) => "MissingState",
            Self::Template(_) => "Template",
            Self::Config(_) => "Config",
        }
    }

    /// Converts to a dictionary representation for diagnostics.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));

        match self {
            Self::InvalidProjectName { name, reason } => {
                map.insert("name".to_string(), serde_json::json!(name));
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
            Self::InvalidDestination { path, reason } => {
                map.insert("path".to_string(), serde_json::json!(path.display().to_string()));
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
            Self::CommandSpawn { program, .. } => {
                map.insert("program".to_string(), serde_json::json!(program));
            }
            Self::CommandFailed { command, code, stderr } => {
                map.insert("command".to_string(), serde_json::json!(command));
                map.insert("code".to_string(), serde_json::json!(code));
                map.insert("stderr".to_string(), serde_json::json!(stderr));
            }
            Self::EmptyOutput { command } => {
                map.insert("command".to_string(), serde_json::json!(command));
            }
            Self::Io { path, .. } => {
                map.insert("path".to_string(), serde_json::json!(path.display().to_string()));
            }
            Self::Timeout { step, seconds } => {
                map.insert("step".to_string(), serde_json::json!(step));
                map.insert("timeout_seconds".to_string(), serde_json::json!(seconds));
            }
            Self::MissingState(_) | Self::Template(_) | Self::Config(_) => {}
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = ScaffoldError::command_failed("pipenv install django", Some(1), "resolver error");
        assert_eq!(
            err.to_string(),
            "Command 'pipenv install django' exited with status 1: resolver error"
        );

        let err = ScaffoldError::command_failed("pipenv --venv", None, "");
        assert!(err.to_string().contains("exited with signal"));
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ScaffoldError::io("/tmp/site/settings.py", source);
        assert!(err.to_string().contains("/tmp/site/settings.py"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_to_dict() {
        let err = ScaffoldError::timeout("generate_project", 30.0);
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "Timeout");
        assert_eq!(dict.get("step").unwrap(), "generate_project");
        assert_eq!(
            dict.get("message").unwrap(),
            "Step 'generate_project' timed out after 30s"
        );
    }

    #[test]
    fn test_invalid_project_name_to_dict() {
        let err = ScaffoldError::invalid_project_name("my-site", "not a Python identifier");
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "InvalidProjectName");
        assert_eq!(dict.get("name").unwrap(), "my-site");
    }
}
