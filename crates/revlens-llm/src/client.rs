//! HTTP client for OpenAI-compatible chat-completion APIs.
//!
//! Wraps `reqwest` with bearer-token auth, status classification and typed
//! response decoding. Transient failures are retried inside
//! [`OpenAiClient::complete`]; everything else surfaces on the first attempt.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use revlens_core::AppConfig;

use crate::error::LlmError;
use crate::retry::retry_with_backoff;
use crate::service::{CompletionRequest, CompletionService};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Longest slice of an error body kept in [`LlmError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Connection and retry settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout_secs: 120,
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.llm_base_url.clone(),
            model: config.llm_model.clone(),
            timeout_secs: config.llm_timeout_secs,
            max_retries: config.llm_max_retries,
            backoff_base_ms: config.llm_retry_backoff_base_ms,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for the `/chat/completions` endpoint.
///
/// Use [`OpenAiClient::new`] with [`ClientOptions::default`] for production or
/// point `base_url` at a mock server in tests.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("api_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed, or [`LlmError::InvalidBaseUrl`] if `options.base_url` does
    /// not parse.
    pub fn new(api_key: &str, options: &ClientOptions) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("revlens/0.1 (review-analysis)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint: completions_endpoint(&options.base_url)?,
            model: options.model.clone(),
            max_retries: options.max_retries,
            backoff_base_ms: options.backoff_base_ms,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one request without retrying.
    async fn send_once(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Err(LlmError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                message: api_error_message(&raw),
            });
        }

        let raw = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&raw).map_err(|e| LlmError::Deserialize {
                context: "chat completion response".to_owned(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

impl CompletionService for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        tracing::debug!(
            model = %self.model,
            prompt_chars = request.user.chars().count(),
            "sending chat completion"
        );
        let content = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_once(request)
        })
        .await?;
        tracing::debug!(
            response_chars = content.chars().count(),
            "chat completion received"
        );
        Ok(content)
    }
}

/// Resolves `{base_url}/chat/completions`, tolerating a trailing slash.
fn completions_endpoint(base_url: &str) -> Result<Url, LlmError> {
    let invalid = |reason: String| LlmError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };
    // A trailing slash makes `join` append instead of replacing the last segment.
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_owned()));
    }
    base.join("chat/completions")
        .map_err(|e| invalid(e.to_string()))
}

/// Pulls `error.message` out of an OpenAI-style error body, falling back to the
/// raw (truncated) body.
fn api_error_message(raw: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|body| {
            body.get("error")
                .and_then(|e| e.get("message"))
                .and_then(serde_json::Value::as_str)
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| raw.to_owned());
    message.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
