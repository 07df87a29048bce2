//! Pipenv command builders.

use crate::process::{CommandSpec, StdioMode};
use std::path::Path;

/// Builds the pipenv invocations used by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipenv {
    program: String,
    packages: Vec<String>,
}

impl Pipenv {
    /// Creates a builder for `program` installing `packages`.
    #[must_use]
    pub fn new(program: impl Into<String>, packages: Vec<String>) -> Self {
        Self {
            program: program.into(),
            packages,
        }
    }

    /// The packages passed to `install`.
    #[must_use]
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// `pipenv shell`. Stdin is closed, so the subshell exits as soon as
    /// the environment exists.
    #[must_use]
    pub fn shell(&self, project_dir: &Path) -> CommandSpec {
        self.base(project_dir).arg("shell").stdio(StdioMode::Stream)
    }

    /// `pipenv install <packages>`. With no packages, installs whatever the
    /// Pipfile declares.
    #[must_use]
    pub fn install(&self, project_dir: &Path) -> CommandSpec {
        self.base(project_dir)
            .arg("install")
            .args(self.packages.iter().cloned())
            .stdio(StdioMode::Stream)
    }

    /// `pipenv --venv`, printing the environment root.
    #[must_use]
    pub fn venv(&self, project_dir: &Path) -> CommandSpec {
        self.base(project_dir).arg("--venv").stdio(StdioMode::Capture)
    }

    fn base(&self, project_dir: &Path) -> CommandSpec {
        CommandSpec::new(&self.program)
            .current_dir(project_dir)
            .env("PIPENV_NOSPIN", "1")
            .env("PIPENV_YES", "1")
    }
}

impl Default for Pipenv {
    fn default() -> Self {
        Self::new("pipenv", vec!["django".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_lists_packages() {
        let pipenv = Pipenv::new("pipenv", vec!["django".into(), "psycopg".into()]);
        let spec = pipenv.install(Path::new("/srv/app"));

        assert_eq!(spec.to_string(), "pipenv install django psycopg");
        assert_eq!(spec.get_current_dir(), Some(Path::new("/srv/app")));
        assert_eq!(spec.get_stdio(), StdioMode::Stream);
    }

    #[test]
    fn test_install_without_packages() {
        let pipenv = Pipenv::new("/usr/local/bin/pipenv", Vec::new());
        assert_eq!(
            pipenv.install(Path::new(".")).to_string(),
            "/usr/local/bin/pipenv install"
        );
    }

    #[test]
    fn test_venv_is_captured() {
        let spec = Pipenv::default().venv(Path::new("/srv/app"));
        assert_eq!(spec.to_string(), "pipenv --venv");
        assert_eq!(spec.get_stdio(), StdioMode::Capture);
    }

    #[test]
    fn test_shell_streams() {
        let spec = Pipenv::default().shell(Path::new("/srv/app"));
        assert_eq!(spec.to_string(), "pipenv shell");
        assert_eq!(spec.get_stdio(), StdioMode::Stream);
    }
}
