//! HTTP client for the web-search service.
//!
//! Wraps `reqwest` with typed error handling, bearer-key management, and
//! retry on transient failures. Callers get an [`SearchOutcome`] whose
//! items are already in the engine's evidence shape.

use std::time::Duration;

use leadscout_core::EvidenceItem;
use serde::Deserialize;

use crate::error::SearchError;
use crate::retry::retry_with_backoff;
use crate::usage::UsageTracker;

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// One search call's result: ranked evidence items plus an optional note
/// (e.g. "search API key not configured", upstream quota warnings).
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub items: Vec<EvidenceItem>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    results: Vec<SearchResultBody>,
    #[serde(default)]
    warning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResultBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    url: String,
    #[serde(default)]
    published_date: Option<String>,
}

/// Client for the web-search REST API.
///
/// A client built without an API key is valid: every search returns an
/// empty outcome with a note instead of failing, so a missing credential
/// degrades research rather than aborting it.
pub struct SearchClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
    usage: UsageTracker,
}

impl SearchClient {
    /// Creates a new client pointed at the production search API.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        usage: UsageTracker,
    ) -> Result<Self, SearchError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, usage, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        usage: UsageTracker,
        base_url: &str,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.map(ToOwned::to_owned),
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries: 3,
            backoff_base_ms: 1_000,
            usage,
        })
    }

    /// Overrides the retry policy (default: 3 retries, 1 s base back-off).
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Runs one search query, returning up to `max_results` evidence items.
    ///
    /// Without an API key this returns an empty outcome with an explanatory
    /// note rather than an error.
    ///
    /// # Errors
    ///
    /// - [`SearchError::QuotaExceeded`] on HTTP 429.
    /// - [`SearchError::ApiError`] if the API returns an error message.
    /// - [`SearchError::Http`] on network failure or other non-2xx status.
    /// - [`SearchError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<SearchOutcome, SearchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(SearchOutcome {
                items: Vec::new(),
                note: Some("search API key not configured".to_owned()),
            });
        };

        self.usage.record_query();
        let result = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.search_once(api_key, query, max_results)
        })
        .await;

        match &result {
            Ok(outcome) => {
                if let Some(note) = &outcome.note {
                    self.usage.record_limit_note(note);
                }
            }
            Err(err) => {
                self.usage.record_failure();
                if let SearchError::QuotaExceeded(msg) = err {
                    self.usage.record_limit_note(msg);
                }
            }
        }
        result
    }

    async fn search_once(
        &self,
        api_key: &str,
        query: &str,
        max_results: usize,
    ) -> Result<SearchOutcome, SearchError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "query": query,
                "max_results": max_results,
            }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let msg = response.text().await.unwrap_or_default();
            return Err(SearchError::QuotaExceeded(if msg.is_empty() {
                "rate limited".to_owned()
            } else {
                msg
            }));
        }

        let response = response.error_for_status()?;
        let body = response.text().await?;
        let parsed: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: url.clone(),
                source: e,
            })?;

        if let Some(msg) = parsed.get("error").and_then(serde_json::Value::as_str) {
            return Err(SearchError::ApiError(msg.to_owned()));
        }

        let body: SearchResponseBody =
            serde_json::from_value(parsed).map_err(|e| SearchError::Deserialize {
                context: format!("search(query={query})"),
                source: e,
            })?;

        let items = body
            .results
            .into_iter()
            .map(|r| EvidenceItem {
                title: r.title,
                content: r.content,
                url: r.url,
                published_date: r.published_date,
            })
            .collect();

        Ok(SearchOutcome {
            items,
            note: body.warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_returns_empty_outcome_with_note() {
        let client = SearchClient::with_base_url(
            None,
            5,
            "leadscout-test",
            UsageTracker::new(),
            "http://127.0.0.1:1",
        )
        .expect("client construction should not fail");

        let outcome = client
            .search("acme corp funding", 5)
            .await
            .expect("missing key must not be an error");
        assert!(outcome.items.is_empty());
        assert_eq!(
            outcome.note.as_deref(),
            Some("search API key not configured")
        );
    }
}
