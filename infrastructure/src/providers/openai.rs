//! OpenAI chat completions provider
//!
//! Works against `api.openai.com` and any server exposing the same
//! `/chat/completions` endpoint.

use super::{api_key_from_env, send_error, status_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use superposition_application::{GatewayError, LlmProvider};
use superposition_domain::{ModelOutput, ModelRequest, TokenUsage};
use tracing::debug;

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider whose key is read from `api_key_env`.
    pub fn from_env(base_url: impl Into<String>, api_key_env: impl Into<String>) -> Self {
        let api_key_env = api_key_env.into();
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key_from_env(&api_key_env),
            api_key_env,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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

        debug!(model = %request.model, "Sending chat completion request");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
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
    let mut messages = Vec::with_capacity(2);
    if !request.system_prompt.is_empty() {
        messages.push(json!({ "role": "system", "content": request.system_prompt }));
    }
    messages.push(json!({ "role": "user", "content": request.prompt }));

    json!({
        "model": request.model.as_str(),
        "messages": messages,
        "temperature": request.sampling.temperature,
        "max_tokens": request.sampling.max_tokens,
    })
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

fn parse_response(body: &str) -> Result<ModelOutput, GatewayError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed body: {}", e)))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidResponse("response has no content".to_string()))?;

    let usage = parsed
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(ModelOutput::new(text).with_usage(usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use superposition_domain::{Model, SamplingParams};

    #[test]
    fn test_request_body_includes_system_prompt() {
        let request = ModelRequest::new(Model::Gpt4oMini, "What is 6 x 7?")
            .with_system_prompt("You are a careful analyst.")
            .with_sampling(SamplingParams {
                temperature: 0.3,
                max_tokens: 256,
            });

        let body = request_body(&request);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "What is 6 x 7?");
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn test_request_body_without_system_prompt() {
        let body = request_body(&ModelRequest::new(Model::Gpt4o, "hi"));
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
    }

    #[test]
    fn test_parse_response_with_usage() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "42\nConfidence: 0.9"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        }"#;

        let output = parse_response(body).unwrap();
        assert_eq!(output.text, "42\nConfidence: 0.9");
        assert_eq!(output.usage.total(), 17);
    }

    #[test]
    fn test_parse_response_without_choices() {
        let err = parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_response_malformed() {
        assert!(matches!(
            parse_response("<html>bad gateway</html>"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_missing_key_fails_credentials_check() {
        let provider = OpenAiProvider::from_env(
            "https://api.openai.com/v1",
            "SUPERPOSITION_TEST_UNSET_OPENAI_KEY",
        );
        assert_eq!(
            provider.check_credentials(),
            Err(GatewayError::MissingCredentials(
                "SUPERPOSITION_TEST_UNSET_OPENAI_KEY".to_string()
            ))
        );
        assert!(provider.with_api_key("sk-test").check_credentials().is_ok());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OpenAiProvider::from_env("http://localhost:11434/v1/", "UNUSED");
        assert_eq!(provider.endpoint(), "http://localhost:11434/v1/chat/completions");
    }
}
