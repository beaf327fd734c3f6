use thiserror::Error;

/// Errors returned by the web-search client.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The search API returned an application-level error message.
    #[error("search API error: {0}")]
    ApiError(String),

    /// The API reported quota exhaustion. Never retried.
    #[error("search quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
