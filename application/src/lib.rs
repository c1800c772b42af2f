//! Application layer for superposition
//!
//! This crate contains use cases, port definitions, the model gateway policy
//! layer and application configuration. It depends only on the domain layer.

pub mod config;
pub mod gateway;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{ExplorerParams, GatewayPolicy};
pub use gateway::{CallTag, ModelGateway};
pub use ports::{
    event_sink::{CompositeEventSink, EventSink, NoEventSink, OrchestrationEvent},
    llm_provider::{GatewayError, LlmProvider},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::explore::{EXPLORER_AGENT, ExploreError, Exploration, HypothesisExplorer};
pub use use_cases::run_superposition::{RunError, RunSuperpositionUseCase, SuperpositionOutput};
