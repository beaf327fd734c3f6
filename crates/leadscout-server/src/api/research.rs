//! Research endpoint: one POST runs the full pipeline for a company.

use axum::{extract::State, Extension, Json};
use leadscout_core::{ExtractedInfo, SignalCounts, SignalSnapshot};
use serde::{Deserialize, Serialize};

use super::{map_engine_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct ResearchBody {
    pub company_name: String,
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct ResearchData {
    pub company_id: Option<i64>,
    pub company_name: String,
    pub cached: bool,
    pub signals: SignalSnapshot,
    pub signal_counts: SignalCounts,
    pub extracted_info: ExtractedInfo,
    pub evidence_count: usize,
    pub warnings: Vec<String>,
}

pub async fn run_research(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ResearchBody>,
) -> Result<Json<ApiResponse<ResearchData>>, ApiError> {
    let outcome = state
        .engine
        .research(&state.pool, &body.company_name, body.force_refresh)
        .await
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    let signal_counts = outcome.snapshot.counts();
    Ok(Json(ApiResponse {
        data: ResearchData {
            company_id: outcome.company_id,
            company_name: outcome.company_name,
            cached: outcome.cached,
            signals: outcome.snapshot,
            signal_counts,
            extracted_info: outcome.extracted,
            evidence_count: outcome.evidence.len(),
            warnings: outcome.warnings,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
