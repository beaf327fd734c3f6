//! Chat-completions client.

use std::time::Duration;

use serde::Deserialize;

use crate::error::LlmError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: String,
}

/// Client for an OpenAI-style chat-completions endpoint.
///
/// Use [`CompletionClient::new`] for production or
/// [`CompletionClient::with_base_url`] to point at a mock server in tests.
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl CompletionClient {
    /// Creates a new client pointed at the production completion API.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<&str>, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: Option<&str>,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.map(ToOwned::to_owned),
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
        })
    }

    /// Whether the client has a key and can issue completions.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one system+user prompt pair and returns the raw completion text.
    ///
    /// The text is free prose from the caller's perspective; it may or may
    /// not contain the JSON the prompt asked for.
    ///
    /// # Errors
    ///
    /// - [`LlmError::MissingApiKey`] if no key was configured.
    /// - [`LlmError::ApiError`] if the API returns an error message.
    /// - [`LlmError::Http`] on network failure or non-2xx status.
    /// - [`LlmError::Deserialize`] / [`LlmError::EmptyResponse`] if the
    ///   envelope is malformed or empty.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "temperature": 0.2,
                "messages": [
                    {"role": "system", "content": system_prompt},
                    {"role": "user", "content": user_prompt},
                ],
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: url.clone(),
                source: e,
            })?;

        if let Some(msg) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(serde_json::Value::as_str)
        {
            return Err(LlmError::ApiError(msg.to_owned()));
        }
        if !status.is_success() {
            return Err(LlmError::ApiError(format!(
                "unexpected status {status}: {body}"
            )));
        }

        let envelope: CompletionEnvelope =
            serde_json::from_value(parsed).map_err(|e| LlmError::Deserialize {
                context: url,
                source: e,
            })?;

        envelope
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}
