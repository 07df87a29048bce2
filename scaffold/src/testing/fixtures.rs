//! Fixtures that stand in for the external toolchain.

use super::ScriptedCommandRunner;
use crate::errors::ScaffoldError;
use crate::process::{CommandOutput, CommandSpec};
use std::path::PathBuf;

const STOCK_FILES: &[(&str, &str)] = &[
    ("__init__.py", ""),
    ("settings.py", "SECRET_KEY = 'django-insecure-stock'\nDEBUG = True\n"),
    ("urls.py", "from django.urls import path\n\nurlpatterns = []\n"),
    ("wsgi.py", "application = None\n"),
    ("asgi.py", "application = None\n"),
];

/// Simulates `python -m django startproject <name> .` by writing the stock
/// project layout into the command's working directory.
pub fn fake_startproject(spec: &CommandSpec) -> Result<CommandOutput, ScaffoldError> {
    let args = spec.get_args();
    let name = args
        .iter()
        .position(|a| a == "startproject")
        .and_then(|i| args.get(i + 1))
        .ok_or_else(|| ScaffoldError::command_failed(spec.to_string(), Some(2), "missing project name"))?;
    let root = spec
        .get_current_dir()
        .map_or_else(|| PathBuf::from("."), PathBuf::from);

    let package = root.join(name);
    std::fs::create_dir_all(&package).map_err(|e| ScaffoldError::io(&package, e))?;
    for (file, contents) in STOCK_FILES {
        let path = package.join(file);
        std::fs::write(&path, contents).map_err(|e| ScaffoldError::io(&path, e))?;
    }

    let manage = root.join("manage.py");
    std::fs::write(&manage, "#!/usr/bin/env python\nimport sys\n")
        .map_err(|e| ScaffoldError::io(&manage, e))?;

    Ok(CommandOutput::ok(""))
}

/// A runner on which every toolchain command succeeds: `pipenv --venv`
/// answers with `venv` and `startproject` lays out a stock project.
#[must_use]
pub fn happy_path_runner(venv: &str) -> ScriptedCommandRunner {
    ScriptedCommandRunner::new()
        .on("--venv", CommandOutput::ok(format!("{venv}\n")))
        .on_with("startproject", fake_startproject)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_startproject_writes_layout() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("python3")
            .args(["-m", "django", "startproject", "blog", "."])
            .current_dir(dir.path());

        fake_startproject(&spec).unwrap();

        assert!(dir.path().join("manage.py").is_file());
        assert!(dir.path().join("blog/settings.py").is_file());
        assert!(dir.path().join("blog/wsgi.py").is_file());
    }
}
