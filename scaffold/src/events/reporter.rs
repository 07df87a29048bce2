//! Verbosity-gated progress reporting.

use super::{EventSink, NoOpEventSink};
use std::fmt;
use std::sync::Arc;

/// Reports pipeline progress to an injected [`EventSink`].
///
/// Lifecycle events (`pipeline.*`, `step.*`) always reach the sink.
/// Human-readable progress messages are only forwarded when the run is
/// verbose.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn EventSink>,
    verbose: bool,
}

impl Reporter {
    /// Creates a reporter over `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>, verbose: bool) -> Self {
        Self { sink, verbose }
    }

    /// A reporter that discards everything.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(Arc::new(NoOpEventSink), false)
    }

    /// Returns true if progress messages are forwarded.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Emits a lifecycle event regardless of verbosity.
    pub fn event(&self, event_type: &str, data: serde_json::Value) {
        self.sink.try_emit(event_type, Some(data));
    }

    /// Reports that a step is making progress.
    pub fn progress(&self, step: &str, message: impl Into<String>) {
        self.message("message.progress", step, message.into());
    }

    /// Reports that a step finished something.
    pub fn success(&self, step: &str, message: impl Into<String>) {
        self.message("message.success", step, message.into());
    }

    /// Reports a problem.
    pub fn error(&self, step: &str, message: impl Into<String>) {
        self.message("message.error", step, message.into());
    }

    fn message(&self, event_type: &str, step: &str, message: String) {
        if !self.verbose {
            return;
        }
        self.sink.try_emit(
            event_type,
            Some(serde_json::json!({
                "step": step,
                "message": message,
            })),
        );
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;

    #[test]
    fn test_quiet_reporter_drops_messages() {
        let sink = Arc::new(CollectingEventSink::new());
        let reporter = Reporter::new(sink.clone(), false);

        reporter.progress("copy_templates", "start");
        reporter.error("copy_templates", "boom");
        assert!(sink.is_empty());

        reporter.event("step.started", serde_json::json!({"step": "copy_templates"}));
        assert_eq!(sink.event_types(), vec!["step.started"]);
    }

    #[test]
    fn test_verbose_reporter_forwards_messages() {
        let sink = Arc::new(CollectingEventSink::new());
        let reporter = Reporter::new(sink.clone(), true);

        reporter.progress("copy_templates", "Copying settings templates");
        reporter.success("copy_templates", "Templates copied");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "message.progress");
        let data = events[1].1.as_ref().unwrap();
        assert_eq!(data["step"], "copy_templates");
        assert_eq!(data["message"], "Templates copied");
    }

    #[test]
    fn test_silent_reporter() {
        let reporter = Reporter::silent();
        assert!(!reporter.is_verbose());
        reporter.event("pipeline.started", serde_json::json!({}));
    }
}
