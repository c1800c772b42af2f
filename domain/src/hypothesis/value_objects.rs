//! Request/response value objects exchanged with the model gateway.

use crate::core::model::Model;
use crate::core::sampling::SamplingParams;
use serde::{Deserialize, Serialize};

/// A single model invocation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub model: Model,
    pub system_prompt: String,
    pub prompt: String,
    pub sampling: SamplingParams,
}

impl ModelRequest {
    pub fn new(model: Model, prompt: impl Into<String>) -> Self {
        Self {
            model,
            system_prompt: String::new(),
            prompt: prompt.into(),
            sampling: SamplingParams::default(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Generated text returned by a successful model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub text: String,
    pub usage: TokenUsage,
    /// Wall-clock latency of the successful attempt
    pub latency_ms: u64,
}

impl ModelOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
            latency_ms: 0,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}
