//! `scaffold` binary.
//!
//! Reads its inputs from the environment:
//!
//! - `SCAFFOLD_PROJECT`: project name (required)
//! - `SCAFFOLD_DEST`: destination directory, default `.`
//! - `SCAFFOLD_VERBOSE`: `1`/`true` for progress messages
//! - `SCAFFOLD_CONFIG`: optional JSON configuration file
//! - `SCAFFOLD_LOG_FORMAT`: `text` (default) or `json`
//!
//! Other `SCAFFOLD_*` variables override configuration fields.

use anyhow::{bail, Context, Result};
use scaffold::config::{ScaffoldConfig, ScaffoldOptions};
use scaffold::observability::{init_logging, LogFormat};
use scaffold::pipeline::Provisioner;
use std::path::PathBuf;

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn load_config() -> Result<ScaffoldConfig> {
    let Some(path) = std::env::var_os("SCAFFOLD_CONFIG") else {
        return Ok(ScaffoldConfig::from_env()?);
    };
    let base = ScaffoldConfig::from_json_file(&path)
        .with_context(|| format!("loading {}", PathBuf::from(&path).display()))?;
    Ok(base.with_overrides(|key| std::env::var(key).ok())?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let verbose = env_flag("SCAFFOLD_VERBOSE");
    let format = std::env::var("SCAFFOLD_LOG_FORMAT")
        .ok()
        .and_then(|raw| LogFormat::parse(&raw))
        .unwrap_or_default();
    if let Err(e) = init_logging(verbose, format) {
        eprintln!("[scaffold] {e}");
    }

    let project = std::env::var("SCAFFOLD_PROJECT").context("SCAFFOLD_PROJECT is not set")?;
    let destination = std::env::var_os("SCAFFOLD_DEST").map_or_else(|| PathBuf::from("."), PathBuf::from);
    let config = load_config()?;

    let options = ScaffoldOptions::new(project).with_verbose_logs(verbose);
    let report = Provisioner::new(config)
        .run_with_report(&options, &destination)
        .await;

    println!("{}", serde_json::to_string_pretty(&report.outcome)?);

    if let Some(error) = report.outcome.error() {
        bail!("provisioning '{}' failed: {error}", options.project_name);
    }
    Ok(())
}
