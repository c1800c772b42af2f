//! Event sink that forwards orchestration events to `tracing`.

use superposition_application::{EventSink, OrchestrationEvent};
use tracing::{debug, info};

/// Emits each event as a structured `tracing` event under the
/// `superposition::events` target.
///
/// Per-attempt gateway events are logged at `DEBUG`; everything else at
/// `INFO`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingEventSink {
    fn emit(&self, event: OrchestrationEvent) {
        let event_type = event.event_type;
        let query_id = event.query_id.to_string();
        let payload = event.payload.to_string();

        if event_type == "gateway_attempt" {
            debug!(
                target: "superposition::events",
                event_type,
                query_id = %query_id,
                latency_ms = event.latency_ms,
                outcome = %event.outcome,
                payload = %payload,
                "gateway attempt"
            );
        } else {
            info!(
                target: "superposition::events",
                event_type,
                query_id = %query_id,
                latency_ms = event.latency_ms,
                outcome = %event.outcome,
                payload = %payload,
                "{}",
                event_type
            );
        }
    }
}
