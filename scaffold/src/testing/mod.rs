//! Testing utilities for provisioning pipelines.
//!
//! This module provides:
//! - A scripted command runner and mock steps
//! - A fake project generator
//! - Assertions for step results

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_error_contains, assert_step_failed, assert_step_succeeded};
pub use fixtures::{fake_startproject, happy_path_runner};
pub use mocks::{MockStep, ScriptedCommandRunner};
