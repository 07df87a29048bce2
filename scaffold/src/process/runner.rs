//! Command runner trait and the tokio-backed implementation.

use super::{CommandOutput, CommandSpec, StdioMode};
use crate::errors::ScaffoldError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Runs commands on behalf of pipeline steps.
///
/// Implementations return `Err` only when the process could not be run at
/// all. A process that ran and exited non-zero is an `Ok` output; use
/// [`ensure_success`] to turn it into an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `spec` to completion.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ScaffoldError>;
}

/// Runs commands as real child processes via `tokio::process`.
///
/// Stdin is always closed. Children are killed if the returned future is
/// dropped, which is how step timeouts terminate them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    /// Creates a new runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ScaffoldError> {
        let program = spec.program();
        let mut command = Command::new(program);
        command
            .args(spec.get_args())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = spec.get_current_dir() {
            command.current_dir(dir);
        }
        for (key, value) in spec.get_envs() {
            command.env(key, value);
        }

        debug!(command = %spec, stdio = ?spec.get_stdio(), "Running command");

        match spec.get_stdio() {
            StdioMode::Capture => {
                let output = command
                    .output()
                    .await
                    .map_err(|e| ScaffoldError::spawn(program, e))?;
                Ok(CommandOutput {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            StdioMode::Stream => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
                let mut child = command
                    .spawn()
                    .map_err(|e| ScaffoldError::spawn(program, e))?;

                let (stdout, stderr) = futures::try_join!(
                    pump(child.stdout.take(), program, "stdout"),
                    pump(child.stderr.take(), program, "stderr"),
                )
                .map_err(|e| ScaffoldError::io(program, e))?;

                let status = child
                    .wait()
                    .await
                    .map_err(|e| ScaffoldError::io(program, e))?;

                Ok(CommandOutput {
                    code: status.code(),
                    stdout,
                    stderr,
                })
            }
        }
    }
}

/// Reads a child stream line by line, logging and buffering each line.
///
/// Bytes that are not valid UTF-8 are replaced rather than treated as a
/// read error, so the exit status is always collected.
async fn pump<R>(reader: Option<R>, program: &str, stream: &'static str) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(String::new());
    };

    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut buffer = String::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\n', '\r']);
        info!(program = %program, stream, "{}", text);
        buffer.push_str(text);
        buffer.push('\n');
    }
    Ok(buffer)
}

/// Converts a non-zero exit into [`ScaffoldError::CommandFailed`].
pub fn ensure_success(spec: &CommandSpec, output: CommandOutput) -> Result<CommandOutput, ScaffoldError> {
    if output.success() {
        Ok(output)
    } else {
        Err(ScaffoldError::command_failed(
            spec.to_string(),
            output.code,
            output.diagnostic(),
        ))
    }
}
