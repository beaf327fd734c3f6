//! Scoring and grading endpoints.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use leadscout_core::{BreakdownRow, GradingResult, LeadAttributes, Tier};
use serde::{Deserialize, Serialize};

use super::rulesets::resolve_ruleset;
use super::{map_engine_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct ScoreBody {
    pub company_name: String,
    /// Scoring is side-effect free unless the caller opts in.
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize)]
pub struct ScoreData {
    pub company_id: i64,
    pub company_name: String,
    pub score: u8,
    pub tier: Tier,
    pub total: i32,
    pub max: i32,
    pub breakdown: Vec<BreakdownRow>,
    pub scored_at: DateTime<Utc>,
    pub warnings: Vec<String>,
}

pub async fn score_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ScoreBody>,
) -> Result<Json<ApiResponse<ScoreData>>, ApiError> {
    let ruleset = resolve_ruleset(&state).await;
    let outcome = state
        .engine
        .score_company(&state.pool, &body.company_name, &ruleset, body.persist)
        .await
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ScoreData {
            company_id: outcome.company_id,
            company_name: body.company_name,
            score: outcome.result.score,
            tier: outcome.result.tier,
            total: outcome.result.total,
            max: outcome.result.max,
            breakdown: outcome.result.breakdown,
            scored_at: outcome.result.scored_at,
            warnings: outcome.warning.into_iter().collect(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchScoreBody {
    pub company_names: Vec<String>,
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize)]
pub struct BatchScoreItemData {
    pub company_name: String,
    pub score: Option<u8>,
    pub tier: Option<Tier>,
    pub error: Option<String>,
}

pub async fn batch_score(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<BatchScoreBody>,
) -> Result<Json<ApiResponse<Vec<BatchScoreItemData>>>, ApiError> {
    if body.company_names.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "company_names must not be empty",
        ));
    }

    let ruleset = resolve_ruleset(&state).await;
    let items = state
        .engine
        .batch_score(&state.pool, &body.company_names, &ruleset, body.persist)
        .await;

    let data = items
        .into_iter()
        .map(|item| BatchScoreItemData {
            company_name: item.company_name,
            score: item.result.as_ref().map(|r| r.score),
            tier: item.result.as_ref().map(|r| r.tier),
            error: item.error,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub struct GradeBody {
    pub company_name: String,
    #[serde(default)]
    pub attributes: LeadAttributes,
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize)]
pub struct GradeData {
    pub company_name: String,
    #[serde(flatten)]
    pub result: GradingResult,
    pub warnings: Vec<String>,
}

pub async fn grade_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<GradeBody>,
) -> Result<Json<ApiResponse<GradeData>>, ApiError> {
    let (result, warning) = state
        .engine
        .grade_lead(&state.pool, &body.company_name, body.attributes, body.persist)
        .await
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: GradeData {
            company_name: body.company_name,
            result,
            warnings: warning.into_iter().collect(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
