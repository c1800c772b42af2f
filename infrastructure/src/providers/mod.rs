//! HTTP LLM providers
//!
//! Each provider implements the application's [`LlmProvider`] port for one
//! wire protocol. Retries, timeouts and the concurrency ceiling live in the
//! gateway; a provider performs exactly one request per `complete` call and
//! classifies failures into [`GatewayError`].

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::sync::Arc;
use std::time::Duration;
use superposition_application::{GatewayError, LlmProvider};

/// Supported wire protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// OpenAI chat completions (and compatible servers)
    #[default]
    OpenAi,
    /// Anthropic messages API
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Connection settings shared by all providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Anthropic `anthropic-version` header
    pub api_version: String,
}

impl ProviderSettings {
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self {
            kind,
            base_url: kind.default_base_url().to_string(),
            api_key_env: kind.default_api_key_env().to_string(),
            api_version: anthropic::DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::for_kind(ProviderKind::default())
    }
}

/// Build the provider described by `settings`, reading its key from the
/// environment.
pub fn build_provider(settings: &ProviderSettings) -> Arc<dyn LlmProvider> {
    match settings.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::from_env(
            &settings.base_url,
            &settings.api_key_env,
        )),
        ProviderKind::Anthropic => Arc::new(
            AnthropicProvider::from_env(&settings.base_url, &settings.api_key_env)
                .with_api_version(&settings.api_version),
        ),
    }
}

/// Read a non-blank API key from the environment.
pub(crate) fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|key| !key.trim().is_empty())
}

/// Classify a non-success HTTP status.
pub(crate) fn status_error(status: StatusCode, headers: &HeaderMap, body: &str) -> GatewayError {
    let detail = format!("{}: {}", status, body.trim());
    match status.as_u16() {
        429 => GatewayError::RateLimited {
            retry_after: headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after),
        },
        401 | 403 => GatewayError::AuthFailed(detail),
        408 => GatewayError::Timeout,
        // Anthropic reports overload as 529
        500..=599 => GatewayError::Transport(detail),
        _ => GatewayError::InvalidResponse(detail),
    }
}

/// Classify a request that never produced a response.
pub(crate) fn send_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(err.to_string())
    }
}

/// Parse a `Retry-After` header given in (possibly fractional) seconds.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}
