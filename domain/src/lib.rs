//! Domain layer for superposition
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Superposition
//!
//! A query is answered by several hypotheses at once, each produced by a
//! different capability (reasoning strategy), framing or temperature:
//!
//! - **Exploration**: N hypotheses are dispatched concurrently and each ends
//!   `Succeeded`, `Failed` or `TimedOut`
//! - **Consensus**: succeeded hypotheses are clustered by similarity and the
//!   largest cluster wins, with every cross-cluster disagreement recorded
//!
//! ## Shared context
//!
//! Hypotheses share an append-only [`ContextBus`]. Entries are immutable and
//! link to their causal predecessors.

pub mod capability;
pub mod config;
pub mod consensus;
pub mod context;
pub mod core;
pub mod hypothesis;
pub mod orchestration;
pub mod prompt;
pub mod util;

// Re-export commonly used types
pub use capability::{
    Capability, CapabilityId, CapabilityRegistry, CapabilityTemplate, builtin_capabilities,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use consensus::{
    AgreementRule, ClusterId, ClusterSummary, ConflictRecord, ConsensusAggregator,
    ConsensusResult, ExactMatch, Resolution, SelectionRule, SimilarityKind, SimilarityPolicy,
    TokenJaccard,
};
pub use context::{AgentId, ContextBus, ContextDraft, ContextEntry, ContextSlice, Cursor, EntryId};
pub use core::{
    error::DomainError,
    model::Model,
    query::{Query, QueryId, QueryParams},
    sampling::{SamplingParams, TemperatureRange},
};
pub use hypothesis::{
    Hypothesis, HypothesisId, HypothesisStatus, ModelOutput, ModelRequest, TokenUsage,
};
pub use orchestration::Phase;
pub use prompt::{Framing, PromptTemplate};
