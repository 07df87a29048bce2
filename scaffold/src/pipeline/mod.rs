//! Pipeline building and execution.
//!
//! This module provides:
//! - Step specifications and failure policies
//! - A validating pipeline builder
//! - The sequential driver and its run report
//! - The assembled Django provisioning pipeline

mod builder;
mod provisioner;
mod runner;
mod spec;

pub use builder::PipelineBuilder;
pub use provisioner::{provision, Provisioner, PIPELINE_NAME};
pub use runner::{Pipeline, PipelineReport, StepRecord};
pub use spec::{FailurePolicy, StepSpec};
