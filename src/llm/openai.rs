//! OpenAI-compatible chat completions client.

use super::{GenerativeError, LlmBackend};
use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// HTTP client for `/chat/completions` style endpoints.
pub struct OpenAiCompatibleBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

impl OpenAiCompatibleBackend {
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self, GenerativeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerativeError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> GenerativeError {
        if e.is_timeout() {
            GenerativeError::Timeout(self.timeout_secs)
        } else {
            GenerativeError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn generate(&self, prompt: &str) -> Result<String, GenerativeError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerativeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GenerativeError::Malformed(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GenerativeError::Malformed("no completion text".to_string()))?;

        debug!(chars = text.len(), "LLM generation complete");
        Ok(text)
    }

    async fn probe(&self) -> Result<(), GenerativeError> {
        let resp = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(GenerativeError::Status {
                status: resp.status().as_u16(),
                body: String::new(),
            })
        }
    }

    fn backend_name(&self) -> &'static str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/v1")
    }

    fn config(endpoint: String) -> LlmConfig {
        LlmConfig {
            endpoint,
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
            assert_eq!(headers["authorization"], "Bearer sk-test");
            assert_eq!(body["model"], "gpt-4");
            assert_eq!(body["temperature"], 0.0);
            let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
            Json(json!({
                "choices": [{"message": {"role": "assistant", "content": format!("echo: {prompt}")}}]
            }))
        }

        let endpoint = spawn(
            Router::new()
                .route("/v1/chat/completions", post(completions))
                .route("/v1/models", get(|| async { Json(json!({"data": []})) })),
        )
        .await;

        let backend = OpenAiCompatibleBackend::new(&config(endpoint), "sk-test").unwrap();
        assert!(backend.probe().await.is_ok());
        assert_eq!(backend.generate("hi").await.unwrap(), "echo: hi");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let endpoint = spawn(Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        ))
        .await;

        let backend = OpenAiCompatibleBackend::new(&config(endpoint), "sk-test").unwrap();
        match backend.generate("hi").await {
            Err(GenerativeError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        // No /models route → probe fails
        assert!(backend.probe().await.is_err());
    }
}
