mod companies;
mod research;
mod rulesets;
mod scoring;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use leadscout_core::AppConfig;
use leadscout_engine::{Engine, EngineConfig, EngineError};
use leadscout_llm::CompletionClient;
use leadscout_search::{SearchClient, UsageTracker};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub engine: Arc<Engine>,
    pub config: Arc<AppConfig>,
    pub usage: UsageTracker,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

#[derive(Debug, Serialize)]
struct UsageData {
    queries_issued: u64,
    queries_failed: u64,
    last_limit_note: Option<String>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &leadscout_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_engine_error(request_id: String, error: &EngineError) -> ApiError {
    match error {
        EngineError::InvalidInput(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        EngineError::NotFound(name) => ApiError::new(
            request_id,
            "not_found",
            format!("company not found: {name}"),
        ),
        EngineError::Db(db_error) => map_db_error(request_id, db_error),
    }
}

/// Constructs the engine from app config: one search client and one
/// completion client shared by every request.
///
/// # Errors
///
/// Fails if either HTTP client cannot be constructed.
pub fn build_engine(config: &AppConfig, usage: UsageTracker) -> anyhow::Result<Engine> {
    let search = SearchClient::with_base_url(
        config.search_api_key.as_deref(),
        config.research_request_timeout_secs,
        &config.research_user_agent,
        usage,
        &config.search_api_url,
    )?
    .with_retry_policy(
        config.search_max_retries,
        config.search_retry_backoff_base_ms,
    );
    let llm = CompletionClient::with_base_url(
        config.llm_api_key.as_deref(),
        &config.llm_model,
        config.research_request_timeout_secs,
        &config.llm_api_url,
    )?;
    Ok(Engine::new(search, llm, EngineConfig::from_app_config(config)))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/companies", get(companies::list_companies))
        .route(
            "/api/v1/companies/{name}",
            get(companies::get_company)
                .patch(companies::update_company)
                .delete(companies::delete_company),
        )
        .route("/api/v1/research", post(research::run_research))
        .route("/api/v1/score", post(scoring::score_company))
        .route("/api/v1/score/batch", post(scoring::batch_score))
        .route("/api/v1/grade", post(scoring::grade_lead))
        .route(
            "/api/v1/ruleset",
            get(rulesets::get_ruleset).put(rulesets::put_ruleset),
        )
        .route("/api/v1/usage", get(search_usage))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match leadscout_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

async fn search_usage(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let snapshot = state.usage.snapshot();
    Json(ApiResponse {
        data: UsageData {
            queries_issued: snapshot.queries_issued,
            queries_failed: snapshot.queries_failed,
            last_limit_note: snapshot.last_limit_note,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::sync::Arc;

    use leadscout_core::{AppConfig, Environment};

    use super::{build_engine, AppState};

    /// App config pointed at mock servers; no real credentials anywhere.
    pub fn test_config(search_url: &str, llm_url: &str) -> AppConfig {
        AppConfig {
            database_url: "postgres://unused".to_owned(),
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "warn".to_owned(),
            ruleset_path: PathBuf::from("../../config/ruleset.yaml"),
            search_api_url: search_url.to_owned(),
            search_api_key: Some("test-search-key".to_owned()),
            llm_api_url: llm_url.to_owned(),
            llm_api_key: Some("test-llm-key".to_owned()),
            llm_model: "gpt-test".to_owned(),
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
            research_request_timeout_secs: 5,
            research_user_agent: "leadscout-test".to_owned(),
            research_per_query_results: 8,
            research_max_evidence: 20,
            research_inter_query_delay_ms: 0,
            research_cache_ttl_days: 7,
            research_snippet_max_chars: 700,
            search_max_retries: 0,
            search_retry_backoff_base_ms: 1,
            api_keys: Vec::new(),
            rate_limit_max_requests: 1_000,
            rate_limit_window_secs: 60,
        }
    }

    pub fn test_state(pool: sqlx::PgPool, search_url: &str, llm_url: &str) -> AppState {
        let config = Arc::new(test_config(search_url, llm_url));
        let usage = leadscout_search::UsageTracker::new();
        let engine = build_engine(&config, usage.clone()).expect("engine");
        AppState {
            pool,
            engine: Arc::new(engine),
            config,
            usage,
        }
    }

    /// Full app over the test state: auth and rate limit built from the
    /// same config the handlers see.
    pub fn test_app(state: AppState) -> axum::Router {
        let auth = crate::middleware::AuthState::from_config(&state.config).expect("auth");
        let rate_limit = crate::middleware::RateLimitState::from_config(&state.config);
        super::build_app(state, auth, rate_limit)
    }
}
