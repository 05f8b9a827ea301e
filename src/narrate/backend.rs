use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::LlmConfig;

const TEMPERATURE: f32 = 0.95;
const MAX_TOKENS: u32 = 120;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid api key header: {0}")]
    InvalidKey(#[from] reqwest::header::InvalidHeaderValue),

    #[error("response missing choices[0].message.content")]
    EmptyResponse,
}

/// A text completion service.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI compatible `/v1/chat/completions` client (Groq, OpenAI, local
/// servers).
#[derive(Debug, Clone)]
pub struct ChatCompletionsBackend {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl ChatCompletionsBackend {
    pub fn new(config: &LlmConfig, timeout: Duration) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for ChatCompletionsBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);

        let res = self
            .http
            .post(url)
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": TEMPERATURE,
                "max_tokens": MAX_TOKENS,
            }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: ChatResponse = res.json().await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(BackendError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    fn backend_for(server: &MockServer) -> ChatCompletionsBackend {
        let config = LlmConfig {
            api_key: "gsk_test".into(),
            endpoint: server.url("/openai/"),
            model: "test-model".into(),
        };
        ChatCompletionsBackend::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn complete_sends_bounded_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/openai/v1/chat/completions")
                    .header("authorization", "Bearer gsk_test")
                    .json_body_partial(r#"{ "model": "test-model", "max_tokens": 120 }"#);
                then.status(200).json_body(serde_json::json!({
                    "choices": [{ "message": { "role": "assistant", "content": "  nice game  " } }]
                }));
            })
            .await;

        let text = backend_for(&server).complete("prompt").await.unwrap();

        assert_eq!(text, "  nice game  ");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(503).body("overloaded");
            })
            .await;

        let res = backend_for(&server).complete("prompt").await;

        assert!(matches!(res, Err(BackendError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn missing_choices_is_empty_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/openai/v1/chat/completions");
                then.status(200).json_body(serde_json::json!({ "choices": [] }));
            })
            .await;

        let res = backend_for(&server).complete("prompt").await;

        assert!(matches!(res, Err(BackendError::EmptyResponse)));
    }
}
