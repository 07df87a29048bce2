//! Core domain model types for scaffold.
//!
//! This module contains the fundamental types used throughout the crate:
//! - The uniform step result type
//! - Platform detection and interpreter path construction
//! - The on-disk layout of a generated project
//! - Secret key generation

mod layout;
mod platform;
mod result;
#[cfg(test)]
mod result_tests;
mod secret;

pub use layout::{ProjectLayout, SETTINGS_DIR};
pub use platform::{interpreter_path, Platform};
pub use result::StepResult;
pub use secret::{generate_secret_key, SecretKey, SECRET_KEY_LENGTH};
