//! Port for structured orchestration events.
//!
//! Defines the [`EventSink`] trait for recording one event per gateway
//! attempt, per resolved hypothesis, per exploration and per consensus
//! decision.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable record (for example JSONL) with a fixed envelope.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use superposition_domain::{ConsensusResult, Hypothesis, HypothesisId, QueryId};

/// A structured orchestration event.
///
/// Every event carries the envelope fields `event_type`, `timestamp`,
/// `query_id`, `latency_ms` and `outcome`; `payload` holds event-specific
/// fields.
#[derive(Debug, Clone)]
pub struct OrchestrationEvent {
    /// Event type identifier (e.g., "gateway_attempt", "consensus_decided").
    pub event_type: &'static str,
    pub timestamp: DateTime<Utc>,
    pub query_id: QueryId,
    pub latency_ms: u64,
    pub outcome: String,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl OrchestrationEvent {
    /// Create a new event with the current UTC timestamp.
    pub fn new(
        event_type: &'static str,
        query_id: QueryId,
        latency_ms: u64,
        outcome: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            query_id,
            latency_ms,
            outcome: outcome.into(),
            payload,
        }
    }

    pub fn gateway_attempt(
        query_id: QueryId,
        hypothesis: Option<HypothesisId>,
        attempt: u32,
        latency_ms: u64,
        outcome: &str,
    ) -> Self {
        Self::new(
            "gateway_attempt",
            query_id,
            latency_ms,
            outcome,
            json!({
                "hypothesis": hypothesis.map(|h| h.to_string()),
                "attempt": attempt,
            }),
        )
    }

    pub fn hypothesis_resolved(hypothesis: &Hypothesis) -> Self {
        Self::new(
            "hypothesis_resolved",
            hypothesis.query_id,
            hypothesis.latency_ms.unwrap_or(0),
            hypothesis.status.as_str(),
            json!({
                "hypothesis": hypothesis.id.to_string(),
                "capability": hypothesis.capability_id.as_str(),
                "framing": hypothesis.framing.as_str(),
                "model": hypothesis.model.as_str(),
                "temperature": hypothesis.temperature,
                "confidence": hypothesis.confidence,
                "error": hypothesis.error,
            }),
        )
    }

    pub fn exploration_complete(
        query_id: QueryId,
        latency_ms: u64,
        dispatched: usize,
        succeeded: usize,
        timed_out: usize,
    ) -> Self {
        let outcome = if succeeded > 0 {
            "succeeded"
        } else {
            "all_attempts_failed"
        };
        Self::new(
            "exploration_complete",
            query_id,
            latency_ms,
            outcome,
            json!({
                "dispatched": dispatched,
                "succeeded": succeeded,
                "timed_out": timed_out,
                "failed": dispatched.saturating_sub(succeeded + timed_out),
            }),
        )
    }

    pub fn consensus_decided(query_id: QueryId, latency_ms: u64, result: &ConsensusResult) -> Self {
        let outcome = if result.quorum_reached {
            "quorum"
        } else {
            "no_quorum"
        };
        Self::new(
            "consensus_decided",
            query_id,
            latency_ms,
            outcome,
            json!({
                "winning_cluster": result.winning_cluster.to_string(),
                "contributing": result.contributing.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
                "agreement": result.agreement,
                "confidence": result.confidence,
                "decided_by": result.decided_by.as_str(),
                "clusters": result.clusters.len(),
                "conflicts": result.conflicts.len(),
            }),
        )
    }

    /// The full record as a flat JSON object (envelope plus payload fields).
    pub fn to_json(&self) -> Value {
        let mut record = json!({
            "type": self.event_type,
            "timestamp": self.timestamp.to_rfc3339(),
            "query_id": self.query_id.to_string(),
            "latency_ms": self.latency_ms,
            "outcome": self.outcome,
        });
        if let (Value::Object(record), Value::Object(payload)) = (&mut record, &self.payload) {
            for (key, value) in payload {
                record.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        record
    }
}

/// Port for emitting orchestration events.
///
/// The `emit` method is synchronous and non-fallible so that observability
/// never disrupts orchestration; sinks swallow their own write failures.
pub trait EventSink: Send + Sync {
    /// Record an orchestration event.
    fn emit(&self, event: OrchestrationEvent);
}

/// No-op implementation for tests and when event logging is disabled.
pub struct NoEventSink;

impl EventSink for NoEventSink {
    fn emit(&self, _event: OrchestrationEvent) {}
}

/// Forwards every event to each inner sink.
#[derive(Default)]
pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl CompositeEventSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for CompositeEventSink {
    fn emit(&self, event: OrchestrationEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.emit(event.clone());
            }
            last.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording(Mutex<Vec<OrchestrationEvent>>);

    impl EventSink for Recording {
        fn emit(&self, event: OrchestrationEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_envelope_fields_present() {
        let query_id = QueryId::generate();
        let event = OrchestrationEvent::gateway_attempt(
            query_id,
            Some(HypothesisId::new(2)),
            1,
            120,
            "rate_limited",
        );
        let json = event.to_json();

        assert_eq!(json["type"], "gateway_attempt");
        assert_eq!(json["query_id"], query_id.to_string());
        assert_eq!(json["latency_ms"], 120);
        assert_eq!(json["outcome"], "rate_limited");
        assert_eq!(json["attempt"], 1);
        assert_eq!(json["hypothesis"], "h2");
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_payload_cannot_override_envelope() {
        let event = OrchestrationEvent::new(
            "custom",
            QueryId::generate(),
            5,
            "ok",
            json!({"outcome": "spoofed", "extra": true}),
        );
        let json = event.to_json();
        assert_eq!(json["outcome"], "ok");
        assert_eq!(json["extra"], true);
    }

    #[test]
    fn test_composite_fans_out() {
        let a = Arc::new(Recording::default());
        let b = Arc::new(Recording::default());
        let composite = CompositeEventSink::new(vec![a.clone(), b.clone()]);

        composite.emit(OrchestrationEvent::exploration_complete(
            QueryId::generate(),
            10,
            3,
            2,
            1,
        ));

        assert_eq!(a.0.lock().unwrap().len(), 1);
        assert_eq!(b.0.lock().unwrap().len(), 1);
        assert_eq!(a.0.lock().unwrap()[0].payload["failed"], 0);
    }
}
