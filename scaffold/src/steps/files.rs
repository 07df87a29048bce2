//! Filesystem steps run after the project has been generated.

use super::{ProvisionContext, Step};
use crate::core::{generate_secret_key, StepResult};
use crate::errors::ScaffoldError;
use crate::templates::{
    copy_templates, has_placeholder, render, write_file, DEFAULT_OVERRIDES, SETTINGS_TEMPLATES,
};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

async fn read_file(path: &Path) -> Result<String, ScaffoldError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ScaffoldError::io(path, e))
}

fn paths_value(paths: &[std::path::PathBuf]) -> serde_json::Value {
    serde_json::Value::Array(
        paths
            .iter()
            .map(|p| serde_json::Value::String(p.display().to_string()))
            .collect(),
    )
}

/// Copies the settings package and ignore file into the destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyTemplates;

#[async_trait]
impl Step for CopyTemplates {
    fn name(&self) -> &str {
        "copy_templates"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        ctx.reporter().progress(self.name(), "Copying settings templates");
        let written = copy_templates(ctx.templates(), SETTINGS_TEMPLATES, ctx.layout(), &[]).await?;
        ctx.reporter().success(self.name(), "Settings templates copied");
        Ok(StepResult::ok_value(paths_value(&written)))
    }
}

/// Generates a secret key and writes it into the development settings.
///
/// The `{{ secret_key }}` placeholder is replaced with a quoted literal. A
/// file without the placeholder gets a `SECRET_KEY` line appended.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteSecret;

#[async_trait]
impl Step for WriteSecret {
    fn name(&self) -> &str {
        "write_secret"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let path = ctx.layout().development_settings();
        let contents = read_file(&path).await?;
        let literal = generate_secret_key().to_python_literal();

        let updated = if has_placeholder(&contents, "secret_key") {
            render(&contents, &[("secret_key", literal.as_str())])
        } else {
            format!("{}\n\nSECRET_KEY = {literal}\n", contents.trim_end())
        };
        write_file(&path, &updated).await?;

        debug!(path = %path.display(), "Secret key written");
        ctx.reporter().success(self.name(), "Secret key generated");
        Ok(StepResult::ok_value(path.display().to_string()))
    }
}

/// Substitutes the project name into the base settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteBaseSettings;

#[async_trait]
impl Step for RewriteBaseSettings {
    fn name(&self) -> &str {
        "rewrite_base_settings"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let path = ctx.layout().base_settings();
        let contents = read_file(&path).await?;
        write_file(&path, &render(&contents, &[("project_name", ctx.project_name())])).await?;
        Ok(StepResult::ok_value(path.display().to_string()))
    }
}

/// Deletes the generator's stock settings module.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveStockSettings;

#[async_trait]
impl Step for RemoveStockSettings {
    fn name(&self) -> &str {
        "remove_stock_settings"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let path = ctx.layout().stock_settings();
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| ScaffoldError::io(&path, e))?;
        Ok(StepResult::ok_value(path.display().to_string()))
    }
}

/// Renames `gitignore` to `.gitignore`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameIgnoreFile;

#[async_trait]
impl Step for RenameIgnoreFile {
    fn name(&self) -> &str {
        "rename_ignore_file"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let from = ctx.layout().ignore_template();
        let to = ctx.layout().ignore_file();
        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| ScaffoldError::io(&from, e))?;
        Ok(StepResult::ok_value(to.display().to_string()))
    }
}

/// Replaces the generated routing and view modules with the stack defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverwriteDefaults;

#[async_trait]
impl Step for OverwriteDefaults {
    fn name(&self) -> &str {
        "overwrite_defaults"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let vars = [("project_name", ctx.project_name())];
        let written = copy_templates(ctx.templates(), DEFAULT_OVERRIDES, ctx.layout(), &vars).await?;
        Ok(StepResult::ok_value(paths_value(&written)))
    }
}

/// Makes `manage.py` executable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixPermissions;

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<(), ScaffoldError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| ScaffoldError::io(path, e))
}

// No mode bits to set; only check the script exists.
#[cfg(not(unix))]
async fn make_executable(path: &Path) -> Result<(), ScaffoldError> {
    tokio::fs::metadata(path)
        .await
        .map(|_| ())
        .map_err(|e| ScaffoldError::io(path, e))
}

#[async_trait]
impl Step for FixPermissions {
    fn name(&self) -> &str {
        "fix_permissions"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let path = ctx.layout().entry_script();
        make_executable(&path).await?;
        Ok(StepResult::ok_value(path.display().to_string()))
    }
}

/// Creates the static assets directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateStaticDir;

#[async_trait]
impl Step for CreateStaticDir {
    fn name(&self) -> &str {
        "create_static_dir"
    }

    async fn execute(&self, ctx: &mut ProvisionContext) -> Result<StepResult, ScaffoldError> {
        let path = ctx.layout().static_dir();
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| ScaffoldError::io(&path, e))?;
        info!(path = %path.display(), "Static directory ready");
        Ok(StepResult::ok_value(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaffoldOptions;
    use crate::core::SECRET_KEY_LENGTH;
    use crate::testing::ScriptedCommandRunner;
    use std::sync::Arc;

    fn context(root: &Path) -> ProvisionContext {
        ProvisionContext::new(
            ScaffoldOptions::new("blog"),
            root,
            Arc::new(ScriptedCommandRunner::new()),
        )
    }

    fn secret_from(contents: &str) -> String {
        let line = contents
            .lines()
            .find(|l| l.starts_with("SECRET_KEY = '"))
            .unwrap();
        line.trim_start_matches("SECRET_KEY = '").trim_end_matches('\'').to_string()
    }

    #[tokio::test]
    async fn test_copy_then_secret() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());

        CopyTemplates.execute(&mut ctx).await.unwrap();
        let result = WriteSecret.execute(&mut ctx).await.unwrap();
        assert!(result.is_success());

        let contents = std::fs::read_to_string(ctx.layout().development_settings()).unwrap();
        assert!(!contents.contains("{{ secret_key }}"));
        assert_eq!(secret_from(&contents).len(), SECRET_KEY_LENGTH);
        assert!(!result.result_str().unwrap().contains(&secret_from(&contents)));
    }

    #[tokio::test]
    async fn test_secret_appended_without_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        let path = ctx.layout().development_settings();
        write_file(&path, "from .base import *\nDEBUG = True\n").await.unwrap();

        WriteSecret.execute(&mut ctx).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("from .base import *\nDEBUG = True\n"));
        assert_eq!(secret_from(&contents).len(), SECRET_KEY_LENGTH);
    }

    #[tokio::test]
    async fn test_secret_requires_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        let err = WriteSecret.execute(&mut ctx).await.unwrap_err();
        assert!(matches!(err, ScaffoldError::Io { .. }));
    }

    #[tokio::test]
    async fn test_rewrite_base_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        CopyTemplates.execute(&mut ctx).await.unwrap();

        RewriteBaseSettings.execute(&mut ctx).await.unwrap();

        let contents = std::fs::read_to_string(ctx.layout().base_settings()).unwrap();
        assert!(contents.contains("ROOT_URLCONF = 'blog.urls'"));
        assert!(contents.contains("WSGI_APPLICATION = 'blog.wsgi.application'"));
    }

    #[tokio::test]
    async fn test_remove_missing_stock_settings_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        let err = RemoveStockSettings.execute(&mut ctx).await.unwrap_err();
        assert!(err.to_string().contains("settings.py"));
    }

    #[tokio::test]
    async fn test_rename_and_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        CopyTemplates.execute(&mut ctx).await.unwrap();

        RenameIgnoreFile.execute(&mut ctx).await.unwrap();
        CreateStaticDir.execute(&mut ctx).await.unwrap();

        assert!(!ctx.layout().ignore_template().exists());
        assert!(ctx.layout().ignore_file().is_file());
        assert!(ctx.layout().static_dir().is_dir());
    }

    #[tokio::test]
    async fn test_overwrite_defaults_renders_project_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        write_file(&ctx.layout().views(), "# stock\n").await.unwrap();

        OverwriteDefaults.execute(&mut ctx).await.unwrap();

        let views = std::fs::read_to_string(ctx.layout().views()).unwrap();
        assert!(views.contains("blog is up and running."));
        assert!(std::fs::read_to_string(ctx.layout().urls()).unwrap().contains("views.index"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fix_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        let script = ctx.layout().entry_script();
        std::fs::write(&script, "#!/usr/bin/env python\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

        FixPermissions.execute(&mut ctx).await.unwrap();

        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
