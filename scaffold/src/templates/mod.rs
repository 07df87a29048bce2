//! Project templates: loading, rendering and copying.
//!
//! The default templates are compiled into the binary. A directory with
//! the same relative layout can be configured instead.

use crate::core::ProjectLayout;
use crate::errors::ScaffoldError;
use std::path::{Path, PathBuf};

/// Where a template lands in the generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateTarget {
    /// Relative to the destination directory.
    Root,
    /// Relative to the generated Python package.
    Package,
}

/// A template file and its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateFile {
    /// Path relative to the template root, `/`-separated.
    pub name: &'static str,
    /// Base directory the file is written under.
    pub target: TemplateTarget,
}

impl TemplateFile {
    const fn package(name: &'static str) -> Self {
        Self {
            name,
            target: TemplateTarget::Package,
        }
    }

    const fn root(name: &'static str) -> Self {
        Self {
            name,
            target: TemplateTarget::Root,
        }
    }

    /// Resolves the destination path inside `layout`.
    #[must_use]
    pub fn destination(&self, layout: &ProjectLayout) -> PathBuf {
        let base = match self.target {
            TemplateTarget::Root => layout.root().to_path_buf(),
            TemplateTarget::Package => layout.package_dir(),
        };
        self.name.split('/').fold(base, |path, segment| path.join(segment))
    }
}

/// Settings package and ignore file, copied before the secret is written.
pub const SETTINGS_TEMPLATES: &[TemplateFile] = &[
    TemplateFile::package("settings/__init__.py"),
    TemplateFile::package("settings/base.py"),
    TemplateFile::package("settings/development.py"),
    TemplateFile::package("settings/production.py"),
    TemplateFile::root("gitignore"),
];

/// Stack defaults that replace the generator's routing and view modules.
pub const DEFAULT_OVERRIDES: &[TemplateFile] = &[
    TemplateFile::package("urls.py"),
    TemplateFile::package("views.py"),
];

/// Returns the compiled-in contents of a default template.
#[must_use]
pub fn embedded(name: &str) -> Option<&'static str> {
    let contents = match name {
        "settings/__init__.py" => include_str!("../../templates/django/settings/__init__.py"),
        "settings/base.py" => include_str!("../../templates/django/settings/base.py"),
        "settings/development.py" => {
            include_str!("../../templates/django/settings/development.py")
        }
        "settings/production.py" => include_str!("../../templates/django/settings/production.py"),
        "gitignore" => include_str!("../../templates/django/gitignore"),
        "urls.py" => include_str!("../../templates/django/urls.py"),
        "views.py" => include_str!("../../templates/django/views.py"),
        _ => return None,
    };
    Some(contents)
}

/// Where template contents are read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateSource {
    /// The compiled-in defaults.
    #[default]
    Embedded,
    /// A directory mirroring the default layout.
    Directory(PathBuf),
}

impl TemplateSource {
    /// Loads the contents of the template called `name`.
    pub async fn load(&self, name: &str) -> Result<String, ScaffoldError> {
        match self {
            Self::Embedded => embedded(name)
                .map(str::to_string)
                .ok_or_else(|| ScaffoldError::Template(format!("unknown template '{name}'"))),
            Self::Directory(dir) => {
                let path = name.split('/').fold(dir.clone(), |path, segment| path.join(segment));
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| ScaffoldError::io(&path, e))
            }
        }
    }
}

/// Replaces `{{ key }}` placeholders with their values.
#[must_use]
pub fn render(contents: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(contents.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{ {key} }}}}"), value)
            .replace(&format!("{{{{{key}}}}}"), value)
    })
}

/// Returns true if `contents` holds a placeholder for `key`.
#[must_use]
pub fn has_placeholder(contents: &str, key: &str) -> bool {
    contents.contains(&format!("{{{{ {key} }}}}")) || contents.contains(&format!("{{{{{key}}}}}"))
}

/// Writes `contents` to `path`, creating parent directories first.
pub async fn write_file(path: &Path, contents: &str) -> Result<(), ScaffoldError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ScaffoldError::io(parent, e))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| ScaffoldError::io(path, e))
}

/// Copies `files` from `source` into `layout`, rendering `vars`.
///
/// Returns the written paths in order. Stops at the first failure.
pub async fn copy_templates(
    source: &TemplateSource,
    files: &[TemplateFile],
    layout: &ProjectLayout,
    vars: &[(&str, &str)],
) -> Result<Vec<PathBuf>, ScaffoldError> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let contents = render(&source.load(file.name).await?, vars);
        let destination = file.destination(layout);
        write_file(&destination, &contents).await?;
        written.push(destination);
    }
    Ok(written)
}
