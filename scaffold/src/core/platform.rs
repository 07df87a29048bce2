//! Platform detection and interpreter path construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The platform family a virtual environment was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Windows: interpreters live under `Scripts/`.
    Windows,
    /// Linux, macOS and other Unix-likes: interpreters live under `bin/`.
    Unix,
}

impl Platform {
    /// Returns the platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Path segments from the environment root to the interpreter.
    #[must_use]
    pub const fn interpreter_segments(self) -> [&'static str; 2] {
        match self {
            Self::Windows => ["Scripts", "python.exe"],
            Self::Unix => ["bin", "python3"],
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Unix => write!(f, "unix"),
        }
    }
}

/// Joins a virtual environment root with the platform's interpreter path.
///
/// Pure: the filesystem is never consulted.
#[must_use]
pub fn interpreter_path(venv: &Path, platform: Platform) -> PathBuf {
    let [dir, binary] = platform.interpreter_segments();
    venv.join(dir).join(binary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_interpreter_path() {
        let path = interpreter_path(Path::new("/home/dev/.venvs/site-x1"), Platform::Unix);
        assert_eq!(path, Path::new("/home/dev/.venvs/site-x1/bin/python3"));
    }

    #[test]
    fn test_windows_interpreter_path() {
        let path = interpreter_path(Path::new("venvs/site"), Platform::Windows);
        assert!(path.ends_with(Path::new("Scripts").join("python.exe")));
    }

    #[test]
    fn test_interpreter_path_is_deterministic() {
        let venv = Path::new("/does/not/exist");
        for platform in [Platform::Unix, Platform::Windows] {
            assert_eq!(interpreter_path(venv, platform), interpreter_path(venv, platform));
        }
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::Unix.to_string(), "unix");
        assert_eq!(Platform::Windows.to_string(), "windows");
    }

    #[test]
    fn test_platform_serialize() {
        let json = serde_json::to_string(&Platform::Windows).unwrap();
        assert_eq!(json, r#""windows""#);
    }
}
