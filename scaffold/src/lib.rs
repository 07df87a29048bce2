//! # Scaffold
//!
//! Provisions a Django project skeleton into an existing directory.
//!
//! A run is a fixed, strictly sequential pipeline of steps:
//!
//! - **Environment**: start the pipenv environment, install packages,
//!   locate the virtualenv and its interpreter
//! - **Generation**: run `django startproject` with that interpreter
//! - **Layout**: split settings, a generated secret key, `.gitignore`,
//!   default routes and views, an executable `manage.py`, `static/`
//!
//! Every step reports through one channel and the first failure ends the
//! run, becoming its result.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scaffold::prelude::*;
//!
//! let options = ScaffoldOptions::new("blog").with_verbose_logs(true);
//! let result = Provisioner::new(ScaffoldConfig::default())
//!     .run(&options, Path::new("/srv/blog"))
//!     .await;
//!
//! if result.is_failure() {
//!     eprintln!("{}", result.error().unwrap_or_default());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod process;
pub mod steps;
pub mod templates;
pub mod testing;
pub mod toolchain;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ScaffoldConfig, ScaffoldOptions};
    pub use crate::core::{generate_secret_key, interpreter_path, Platform, ProjectLayout, StepResult};
    pub use crate::errors::ScaffoldError;
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, Reporter};
    pub use crate::pipeline::{
        provision, FailurePolicy, Pipeline, PipelineBuilder, PipelineReport, Provisioner,
    };
    pub use crate::process::{CommandOutput, CommandRunner, CommandSpec, StdioMode, SystemCommandRunner};
    pub use crate::steps::{ProvisionContext, Step};
    pub use crate::templates::TemplateSource;
}
