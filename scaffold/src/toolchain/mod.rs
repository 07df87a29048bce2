//! Command builders for the external tools the pipeline drives.
//!
//! - [`Pipenv`]: environment bootstrap, dependency installation, venv lookup
//! - [`DjangoAdmin`]: project generation and project-name rules

mod django;
mod pipenv;

pub use django::{validate_project_name, DjangoAdmin};
pub use pipenv::Pipenv;
