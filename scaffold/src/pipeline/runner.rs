//! Sequential pipeline execution.

use super::{FailurePolicy, StepSpec};
use crate::core::StepResult;
use crate::steps::ProvisionContext;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Execution record of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Step name.
    pub name: String,
    /// Policy the step ran under.
    pub policy: FailurePolicy,
    /// Execution time in milliseconds.
    pub duration_ms: f64,
    /// What the step returned.
    pub result: StepResult,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Pipeline name.
    pub pipeline: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Total execution time in milliseconds.
    pub duration_ms: f64,
    /// Records of the steps that ran, in order.
    pub steps: Vec<StepRecord>,
    /// The overall result.
    pub outcome: StepResult,
}

impl PipelineReport {
    /// A report for a run rejected before any step executed.
    #[must_use]
    pub fn rejected(pipeline: impl Into<String>, outcome: StepResult) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline: pipeline.into(),
            started_at: Utc::now(),
            duration_ms: 0.0,
            steps: Vec::new(),
            outcome,
        }
    }

    /// Names of the steps that ran.
    #[must_use]
    pub fn executed_steps(&self) -> Vec<&str> {
        self.steps.iter().map(|r| r.name.as_str()).collect()
    }

    /// Record of the step called `name`, if it ran.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.name == name)
    }

    /// Steps that failed under [`FailurePolicy::Continue`].
    #[must_use]
    pub fn tolerated_failures(&self) -> Vec<&StepRecord> {
        self.steps
            .iter()
            .filter(|r| r.policy == FailurePolicy::Continue && r.result.is_failure())
            .collect()
    }

    /// Returns true if the pipeline succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// An ordered list of steps run one after another.
///
/// A failed step under [`FailurePolicy::Abort`] ends the run and its result
/// becomes the pipeline's result, unchanged. Nothing already written is
/// rolled back.
#[derive(Clone)]
pub struct Pipeline {
    name: String,
    steps: Vec<StepSpec>,
}

impl Pipeline {
    pub(super) fn new(name: String, steps: Vec<StepSpec>) -> Self {
        Self { name, steps }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(StepSpec::name).collect()
    }

    /// Failure policies in execution order.
    #[must_use]
    pub fn policies(&self) -> Vec<FailurePolicy> {
        self.steps.iter().map(|s| s.policy).collect()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order against `ctx`.
    pub async fn run(&self, ctx: &mut ProvisionContext) -> PipelineReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        info!(pipeline = %self.name, %run_id, project = %ctx.project_name(), "Pipeline started");
        ctx.reporter().event(
            "pipeline.started",
            serde_json::json!({
                "pipeline": &self.name,
                "run_id": run_id,
                "project": ctx.project_name(),
                "steps": self.step_names(),
            }),
        );

        let mut records = Vec::with_capacity(self.steps.len());
        let mut outcome = StepResult::ok();

        for spec in &self.steps {
            let name = spec.name();
            ctx.reporter()
                .event("step.started", serde_json::json!({ "step": name }));
            debug!(step = %name, "Step started");

            let step_start = Instant::now();
            let result = match spec.step.execute(ctx).await {
                Ok(result) => result,
                Err(err) => {
                    warn!(step = %name, error = %err, kind = err.kind(), "Step raised an error");
                    ctx.reporter().error(name, err.to_string());
                    StepResult::from(&err)
                }
            };
            let duration_ms = step_start.elapsed().as_secs_f64() * 1000.0;

            records.push(StepRecord {
                name: name.to_string(),
                policy: spec.policy,
                duration_ms,
                result: result.clone(),
            });

            if result.is_success() {
                ctx.reporter().event(
                    "step.completed",
                    serde_json::json!({ "step": name, "duration_ms": duration_ms }),
                );
                continue;
            }

            match spec.policy {
                FailurePolicy::Abort => {
                    ctx.reporter().event(
                        "step.failed",
                        serde_json::json!({
                            "step": name,
                            "error": result.error(),
                            "duration_ms": duration_ms,
                        }),
                    );
                    outcome = result;
                    break;
                }
                FailurePolicy::Continue => {
                    warn!(step = %name, error = ?result.error(), "Step failed, continuing");
                    ctx.reporter().event(
                        "step.skipped_failure",
                        serde_json::json!({ "step": name, "error": result.error() }),
                    );
                }
            }
        }

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        if outcome.is_success() {
            info!(pipeline = %self.name, %run_id, duration_ms, "Pipeline completed");
            ctx.reporter().event(
                "pipeline.completed",
                serde_json::json!({ "pipeline": &self.name, "run_id": run_id, "duration_ms": duration_ms }),
            );
        } else {
            warn!(pipeline = %self.name, %run_id, error = ?outcome.error(), "Pipeline failed");
            ctx.reporter().event(
                "pipeline.failed",
                serde_json::json!({
                    "pipeline": &self.name,
                    "run_id": run_id,
                    "error": outcome.error(),
                    "duration_ms": duration_ms,
                }),
            );
        }

        PipelineReport {
            run_id,
            pipeline: self.name.clone(),
            started_at,
            duration_ms,
            steps: records,
            outcome,
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaffoldOptions;
    use crate::events::{CollectingEventSink, Reporter};
    use crate::pipeline::PipelineBuilder;
    use crate::testing::{MockStep, ScriptedCommandRunner};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn context(sink: Arc<CollectingEventSink>) -> ProvisionContext {
        ProvisionContext::new(
            ScaffoldOptions::new("blog"),
            "/srv",
            Arc::new(ScriptedCommandRunner::new()),
        )
        .with_reporter(Reporter::new(sink, false))
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let pipeline = PipelineBuilder::new("p")
            .step(Arc::new(MockStep::new("a").with_journal(journal.clone())))
            .step(Arc::new(MockStep::new("b").with_journal(journal.clone())))
            .build()
            .unwrap();
        let sink = Arc::new(CollectingEventSink::new());

        let report = pipeline.run(&mut context(sink.clone())).await;

        assert!(report.is_success());
        assert_eq!(report.outcome, StepResult::ok());
        assert_eq!(*journal.lock(), vec!["a", "b"]);
        assert_eq!(
            sink.event_types(),
            vec![
                "pipeline.started",
                "step.started",
                "step.completed",
                "step.started",
                "step.completed",
                "pipeline.completed",
            ]
        );
    }

    #[tokio::test]
    async fn test_abort_returns_failed_result_unchanged() {
        let failed = StepResult::fail_with("boom", serde_json::json!({ "stdout": "partial" }));
        let last = Arc::new(MockStep::new("c"));
        let pipeline = PipelineBuilder::new("p")
            .step(Arc::new(MockStep::new("a")))
            .step(Arc::new(MockStep::new("b").with_result(failed.clone())))
            .step(last.clone())
            .build()
            .unwrap();
        let sink = Arc::new(CollectingEventSink::new());

        let report = pipeline.run(&mut context(sink.clone())).await;

        assert_eq!(report.outcome, failed);
        assert_eq!(report.executed_steps(), vec!["a", "b"]);
        assert_eq!(last.call_count(), 0);
        assert_eq!(sink.events_of_type("pipeline.failed").len(), 1);
    }

    #[tokio::test]
    async fn test_error_becomes_failed_result() {
        let pipeline = PipelineBuilder::new("p")
            .step(Arc::new(MockStep::erroring("a", "disk full")))
            .build()
            .unwrap();

        let report = pipeline
            .run(&mut context(Arc::new(CollectingEventSink::new())))
            .await;

        assert!(!report.is_success());
        assert!(report.outcome.error().unwrap().contains("disk full"));
    }

    #[tokio::test]
    async fn test_continue_policy_tolerates_failure() {
        let last = Arc::new(MockStep::new("c"));
        let pipeline = PipelineBuilder::new("p")
            .step(Arc::new(MockStep::new("a")))
            .step_with_policy(
                Arc::new(MockStep::erroring("b", "permission denied")),
                FailurePolicy::Continue,
            )
            .step(last.clone())
            .build()
            .unwrap();
        let sink = Arc::new(CollectingEventSink::new());

        let report = pipeline.run(&mut context(sink.clone())).await;

        assert!(report.is_success());
        assert_eq!(last.call_count(), 1);
        assert_eq!(report.tolerated_failures().len(), 1);
        assert_eq!(report.tolerated_failures()[0].name, "b");
        assert_eq!(sink.events_of_type("step.skipped_failure").len(), 1);
    }

    #[tokio::test]
    async fn test_step_timeout_aborts() {
        let pipeline = PipelineBuilder::new("p")
            .step(Arc::new(
                MockStep::new("slow").with_delay(std::time::Duration::from_secs(30)),
            ))
            .with_step_timeout(Some(std::time::Duration::from_millis(20)))
            .build()
            .unwrap();

        let report = pipeline
            .run(&mut context(Arc::new(CollectingEventSink::new())))
            .await;

        assert!(report.outcome.error().unwrap().contains("timed out"));
        assert_eq!(report.record("slow").unwrap().name, "slow");
    }
}
