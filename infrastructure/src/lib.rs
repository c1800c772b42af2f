//! Infrastructure layer for superposition
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP LLM providers, event sinks and
//! configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileCapabilityConfig, FileConfig, FileConsensusConfig,
    FileExplorerConfig, FileGatewayConfig, FileLoggingConfig, FileProviderConfig,
};
pub use logging::{JsonlEventSink, TracingEventSink};
pub use providers::{
    AnthropicProvider, OpenAiProvider, ProviderKind, ProviderSettings, build_provider,
};
