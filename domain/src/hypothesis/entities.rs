//! Hypothesis entity and its status state machine.
//!
//! ```text
//!            ┌──────────► Succeeded
//!  Pending ──┼──────────► Failed
//!            └──────────► TimedOut
//! ```
//!
//! Terminal states are final: any further transition is rejected with
//! [`DomainError::InvalidTransition`].

use super::parsing::split_confidence;
use super::value_objects::{ModelOutput, TokenUsage};
use crate::capability::CapabilityId;
use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::core::query::QueryId;
use crate::prompt::Framing;
use crate::util::now_millis;
use serde::{Deserialize, Serialize};

/// Identifier of a hypothesis within its query: the dispatch index.
///
/// Lower ids were dispatched earlier, which consensus uses as its final
/// tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HypothesisId(u32);

impl HypothesisId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for HypothesisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// Lifecycle status of a hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisStatus {
    Pending,
    Succeeded,
    Failed,
    TimedOut,
}

impl HypothesisStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, HypothesisStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HypothesisStatus::Pending => "pending",
            HypothesisStatus::Succeeded => "succeeded",
            HypothesisStatus::Failed => "failed",
            HypothesisStatus::TimedOut => "timed_out",
        }
    }
}

impl std::fmt::Display for HypothesisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One parallel attempt at answering a query (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: HypothesisId,
    pub query_id: QueryId,
    pub capability_id: CapabilityId,
    pub framing: Framing,
    pub model: Model,
    pub temperature: f32,
    /// The prompt actually sent
    pub prompt: String,
    pub status: HypothesisStatus,
    /// Raw model output (succeeded only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Self-reported confidence parsed from the output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Time from dispatch to resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub dispatched_at_ms: u64,
}

impl Hypothesis {
    /// Create a hypothesis in the `Pending` state.
    pub fn dispatch(
        id: HypothesisId,
        query_id: QueryId,
        capability_id: CapabilityId,
        framing: Framing,
        model: Model,
        temperature: f32,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id,
            query_id,
            capability_id,
            framing,
            model,
            temperature,
            prompt: prompt.into(),
            status: HypothesisStatus::Pending,
            output: None,
            confidence: None,
            usage: None,
            latency_ms: None,
            error: None,
            dispatched_at_ms: now_millis(),
        }
    }

    fn transition(&mut self, to: HypothesisStatus) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidTransition {
                id: self.id.to_string(),
                from: self.status.to_string(),
            });
        }
        self.status = to;
        self.latency_ms = Some(now_millis().saturating_sub(self.dispatched_at_ms));
        Ok(())
    }

    /// Resolve with a model output.
    pub fn succeed(&mut self, output: ModelOutput) -> Result<(), DomainError> {
        self.transition(HypothesisStatus::Succeeded)?;
        let (_, confidence) = split_confidence(&output.text);
        self.confidence = confidence;
        self.usage = Some(output.usage);
        self.output = Some(output.text);
        Ok(())
    }

    /// Resolve with a terminal error.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), DomainError> {
        self.transition(HypothesisStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    /// Resolve as timed out; any output arriving later is discarded by the caller.
    pub fn time_out(&mut self, detail: impl Into<String>) -> Result<(), DomainError> {
        self.transition(HypothesisStatus::TimedOut)?;
        self.error = Some(detail.into());
        Ok(())
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == HypothesisStatus::Succeeded
    }

    /// The answer body with any trailing confidence marker removed.
    pub fn answer(&self) -> Option<String> {
        self.output.as_deref().map(|o| split_confidence(o).0)
    }
}
