//! LLM client for the chatbot
//!
//! Speaks the OpenAI chat completions protocol, which most hosted and
//! self-hosted model servers accept.

use crate::config::AiConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// One message of a chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: String,
    pub content: String,
}

impl LlmMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Errors from the LLM seam
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI is disabled")]
    Disabled,

    #[error("LLM request failed: {0}")]
    Transport(String),

    #[error("LLM returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM returned an empty answer")]
    EmptyAnswer,
}

/// Anything that can turn a conversation into an answer
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[LlmMessage]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    enabled: bool,
}

impl OpenAiClient {
    pub fn new(config: &AiConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            enabled: config.enabled,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[LlmMessage]) -> Result<String, LlmError> {
        if !self.enabled {
            return Err(LlmError::Disabled);
        }

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        debug!(model = %self.model, messages = messages.len(), "Sending chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "LLM request rejected");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyAnswer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, enabled: bool) -> AiConfig {
        AiConfig {
            enabled,
            api_url: format!("{}/v1/", server.uri()),
            api_key: "sk-test".to_string(),
            model: "test-model".to_string(),
            ..AiConfig::default()
        }
    }

    #[test]
    fn test_new_builds_client_for_configured_endpoint() {
        let client = OpenAiClient::new(&AiConfig {
            api_url: "http://llm.local/v1/".to_string(),
            timeout_secs: 5,
            ..AiConfig::default()
        })
        .unwrap();
        assert_eq!(client.endpoint, "http://llm.local/v1/chat/completions");
        assert!(!client.enabled);
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(json!({"model": "test-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  Haz 3 series.  "}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&config(&server, true)).unwrap();
        let answer = client.complete(&[LlmMessage::user("hola")]).await.unwrap();
        assert_eq!(answer, "Haz 3 series.");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&config(&server, true)).unwrap();
        let err = client.complete(&[LlmMessage::user("hola")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&config(&server, true)).unwrap();
        let err = client.complete(&[LlmMessage::user("hola")]).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyAnswer));
    }

    #[tokio::test]
    async fn test_disabled_client_never_calls_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let client = OpenAiClient::new(&config(&server, false)).unwrap();
        let err = client.complete(&[LlmMessage::user("hola")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Disabled));
    }
}
