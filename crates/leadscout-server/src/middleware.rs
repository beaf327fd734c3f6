//! Request plumbing: request IDs, bearer-key auth, and a fixed-window
//! rate limit. Rejections use the same [`ApiError`] envelope as handlers,
//! so clients see one error shape regardless of where a request died.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use leadscout_core::{AppConfig, Environment};
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer-key auth settings, derived from [`AppConfig::api_keys`].
///
/// An empty key set disables auth entirely; `from_config` only permits
/// that outside production so a deploy cannot silently run open.
#[derive(Debug, Clone)]
pub struct AuthState {
    keys: Arc<HashSet<String>>,
}

impl AuthState {
    /// # Errors
    ///
    /// Fails when no API keys are configured in production.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if config.api_keys.is_empty() {
            if config.env == Environment::Production {
                anyhow::bail!(
                    "LEADSCOUT_API_KEYS must provide at least one bearer token in production"
                );
            }
            tracing::warn!(env = %config.env, "no API keys configured; bearer auth disabled");
        }
        Ok(Self {
            keys: Arc::new(config.api_keys.iter().cloned().collect()),
        })
    }

    fn accepts(&self, header: Option<&HeaderValue>) -> bool {
        header
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .is_some_and(|token| !token.is_empty() && self.keys.contains(token))
    }
}

struct Window {
    opened: Instant,
    admitted: usize,
}

/// Fixed-window rate limiter shared across all routes.
#[derive(Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    current: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            current: Arc::new(Mutex::new(Window {
                opened: Instant::now(),
                admitted: 0,
            })),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )
    }

    /// Admits one request if the current window has capacity, rolling the
    /// window over when it has expired.
    fn try_admit(&self) -> bool {
        let mut window = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if window.opened.elapsed() >= self.window {
            window.opened = Instant::now();
            window.admitted = 0;
        }
        if window.admitted >= self.max_requests {
            return false;
        }
        window.admitted += 1;
        true
    }
}

/// Assigns every request an ID: the caller's `x-request-id` header when
/// present, a fresh `UUIDv4` otherwise. The ID rides request extensions as
/// [`RequestId`] and is echoed on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Rejects requests without a configured bearer token. A no-op when the
/// key set is empty (non-production convenience).
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if auth.keys.is_empty() || auth.accepts(req.headers().get(AUTHORIZATION)) {
        return next.run(req).await;
    }
    reject(&req, "unauthorized", "missing or invalid bearer token")
}

/// Rejects requests once the current window is exhausted.
pub async fn enforce_rate_limit(
    State(limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if limit.try_admit() {
        return next.run(req).await;
    }
    reject(&req, "rate_limited", "rate limit exceeded")
}

fn reject(req: &Request, code: &str, message: &str) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    ApiError::new(request_id, code, message).into_response()
}
