//! Child process execution.
//!
//! Steps describe the command they need as a [`CommandSpec`] and hand it
//! to a [`CommandRunner`]. Exit status is always captured, whatever the
//! [`StdioMode`], so failure reporting does not depend on how output is
//! displayed.

mod command;
mod runner;

pub use command::{CommandOutput, CommandSpec, StdioMode};
#[cfg(test)]
pub use runner::MockCommandRunner;
pub use runner::{ensure_success, CommandRunner, SystemCommandRunner};
