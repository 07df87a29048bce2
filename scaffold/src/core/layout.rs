//! On-disk layout of a generated project.

use std::path::{Path, PathBuf};

/// Name of the settings package inside the project package.
pub const SETTINGS_DIR: &str = "settings";

const BASE_SETTINGS: &str = "base.py";
const DEVELOPMENT_SETTINGS: &str = "development.py";
const STOCK_SETTINGS: &str = "settings.py";
const IGNORE_TEMPLATE: &str = "gitignore";
const IGNORE_FILE: &str = ".gitignore";
const ENTRY_SCRIPT: &str = "manage.py";
const STATIC_DIR: &str = "static";

/// Every path the pipeline reads or writes, derived from the destination
/// directory and the project name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    project_name: String,
}

impl ProjectLayout {
    /// Creates a layout rooted at `root` for `project_name`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, project_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            project_name: project_name.into(),
        }
    }

    /// The destination directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The project name.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// The Python package created by the generator.
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.root.join(&self.project_name)
    }

    /// The settings package replacing the stock settings module.
    #[must_use]
    pub fn settings_dir(&self) -> PathBuf {
        self.package_dir().join(SETTINGS_DIR)
    }

    /// Settings file holding the generated secret key.
    #[must_use]
    pub fn development_settings(&self) -> PathBuf {
        self.settings_dir().join(DEVELOPMENT_SETTINGS)
    }

    /// Shared settings rewritten with the project name.
    #[must_use]
    pub fn base_settings(&self) -> PathBuf {
        self.settings_dir().join(BASE_SETTINGS)
    }

    /// The generator's default settings module.
    #[must_use]
    pub fn stock_settings(&self) -> PathBuf {
        self.package_dir().join(STOCK_SETTINGS)
    }

    /// The ignore file as copied from the templates.
    #[must_use]
    pub fn ignore_template(&self) -> PathBuf {
        self.root.join(IGNORE_TEMPLATE)
    }

    /// The ignore file under its conventional name.
    #[must_use]
    pub fn ignore_file(&self) -> PathBuf {
        self.root.join(IGNORE_FILE)
    }

    /// The project's URL routing module.
    #[must_use]
    pub fn urls(&self) -> PathBuf {
        self.package_dir().join("urls.py")
    }

    /// The project's view module.
    #[must_use]
    pub fn views(&self) -> PathBuf {
        self.package_dir().join("views.py")
    }

    /// The management entry point script.
    #[must_use]
    pub fn entry_script(&self) -> PathBuf {
        self.root.join(ENTRY_SCRIPT)
    }

    /// Directory for static assets.
    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        self.root.join(STATIC_DIR)
    }
}
