//! Django project generation.

use crate::errors::ScaffoldError;
use crate::process::{CommandSpec, StdioMode};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise",
    "return", "try", "while", "with", "yield",
];

// startproject refuses names that shadow these modules.
const RESERVED_MODULES: &[&str] = &["django", "test", "site", "os", "sys"];

/// Checks that `name` can be used as the generated Python package name.
pub fn validate_project_name(name: &str) -> Result<(), ScaffoldError> {
    if name.is_empty() {
        return Err(ScaffoldError::invalid_project_name(name, "name is empty"));
    }
    if !IDENTIFIER.as_ref().is_some_and(|re| re.is_match(name)) {
        return Err(ScaffoldError::invalid_project_name(
            name,
            "must be a valid Python identifier (letters, digits, underscores)",
        ));
    }
    if PYTHON_KEYWORDS.contains(&name) {
        return Err(ScaffoldError::invalid_project_name(name, "is a Python keyword"));
    }
    if RESERVED_MODULES.contains(&name) {
        return Err(ScaffoldError::invalid_project_name(
            name,
            "conflicts with an existing Python module",
        ));
    }
    Ok(())
}

/// Builds the framework's project-creation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DjangoAdmin {
    module: String,
}

impl DjangoAdmin {
    /// Creates a builder invoking `python -m <module>`.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }

    /// `<interpreter> -m django startproject <name> .` run inside
    /// `project_dir`, so `manage.py` lands at its root.
    #[must_use]
    pub fn startproject(&self, interpreter: &Path, name: &str, project_dir: &Path) -> CommandSpec {
        CommandSpec::new(interpreter.to_string_lossy())
            .args(["-m", self.module.as_str(), "startproject", name, "."])
            .current_dir(project_dir)
            .stdio(StdioMode::Capture)
    }
}

impl Default for DjangoAdmin {
    fn default() -> Self {
        Self::new("django")
    }
}
