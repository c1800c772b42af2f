//! LLM provider port
//!
//! Defines the interface for sending one completion request to a remote
//! model service. Retry, timeout and admission control live in
//! [`ModelGateway`](crate::gateway::ModelGateway), not in providers.

use async_trait::async_trait;
use std::time::Duration;
use superposition_domain::{ModelOutput, ModelRequest};
use thiserror::Error;

/// Errors that can occur while invoking a model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Rate limited by provider")]
    RateLimited {
        /// Provider hint for when to retry
        retry_after: Option<Duration>,
    },

    #[error("Timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

impl GatewayError {
    /// Transient errors are retried within the gateway's budget
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::RateLimited { .. } | GatewayError::Timeout | GatewayError::Transport(_)
        )
    }

    /// Short machine-readable kind, used as an event outcome
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::RateLimited { .. } => "rate_limited",
            GatewayError::Timeout => "timeout",
            GatewayError::Transport(_) => "transport",
            GatewayError::InvalidResponse(_) => "invalid_response",
            GatewayError::AuthFailed(_) => "auth_failed",
            GatewayError::MissingCredentials(_) => "missing_credentials",
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// A remote model service
///
/// Implementations (adapters) live in the infrastructure layer. One call to
/// [`complete`](LlmProvider::complete) is one network attempt.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Fail fast when credentials are absent, before any request is sent.
    fn check_credentials(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    /// Send one request and wait for the full response
    async fn complete(&self, request: &ModelRequest) -> Result<ModelOutput, GatewayError>;
}
