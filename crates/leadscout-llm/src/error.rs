use thiserror::Error;

/// Errors returned by the completion client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was configured; completions cannot run at all.
    #[error("completion API key not configured")]
    MissingApiKey,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an application-level error message.
    #[error("completion API error: {0}")]
    ApiError(String),

    /// The response envelope could not be deserialized.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The envelope parsed but contained no completion choices.
    #[error("completion response contained no choices")]
    EmptyResponse,
}
