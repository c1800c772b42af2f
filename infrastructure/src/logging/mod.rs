//! Logging infrastructure: event sinks for orchestration events.
//!
//! - [`JsonlEventSink`] appends one JSON object per line to a file
//! - [`TracingEventSink`] forwards events to the `tracing` subscriber

mod jsonl_sink;
mod tracing_sink;

pub use jsonl_sink::JsonlEventSink;
pub use tracing_sink::TracingEventSink;
