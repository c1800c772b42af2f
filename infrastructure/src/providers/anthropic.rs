//! Anthropic messages API provider

use super::{api_key_from_env, send_error, status_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use superposition_application::{GatewayError, LlmProvider};
use superposition_domain::{ModelOutput, ModelRequest, TokenUsage};
use tracing::debug;

pub const DEFAULT_API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key_env: String,
    api_key: Option<String>,
    api_version: String,
}

impl AnthropicProvider {
    /// Create a provider whose key is read from `api_key_env`.
    pub fn from_env(base_url: impl Into<String>, api_key_env: impl Into<String>) -> Self {
        let api_key_env = api_key_env.into();
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key_from_env(&api_key_env),
            api_key_env,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn check_credentials(&self) -> Result<(), GatewayError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(GatewayError::MissingCredentials(self.api_key_env.clone())),
        }
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelOutput, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::MissingCredentials(self.api_key_env.clone()))?;

        debug!(model = %request.model, "Sending messages request");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(&request_body(request))
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(send_error)?;
        if !status.is_success() {
            return Err(status_error(status, &headers, &body));
        }
        parse_response(&body)
    }
}

fn request_body(request: &ModelRequest) -> Value {
    let mut body = json!({
        "model": request.model.as_str(),
        "max_tokens": request.sampling.max_tokens,
        "temperature": request.sampling.temperature,
        "messages": [{ "role": "user", "content": request.prompt }],
    });
    if !request.system_prompt.is_empty() {
        body["system"] = json!(request.system_prompt);
    }
    body
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

fn parse_response(body: &str) -> Result<ModelOutput, GatewayError> {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed body: {}", e)))?;

    let text: String = parsed
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        return Err(GatewayError::InvalidResponse(
            "response has no text content".to_string(),
        ));
    }

    let usage = parsed
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
        })
        .unwrap_or_default();

    Ok(ModelOutput::new(text).with_usage(usage))
}
