//! Event sinks and progress reporting.
//!
//! The pipeline never logs through ambient global state: an
//! [`EventSink`] is handed to it explicitly, and a [`Reporter`] gates the
//! human-readable progress messages on the run's verbosity flag.

mod reporter;
mod sink;

pub use reporter::Reporter;
pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
