use thiserror::Error;

/// Errors returned by the completion service.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status other than 429.
    #[error("completion API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// HTTP 429. `retry_after_secs` comes from the `Retry-After` header when present.
    #[error("rate limited by completion API (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The API answered 2xx but carried no message content.
    #[error("completion API returned no message content")]
    EmptyResponse,

    #[error("invalid completion API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
