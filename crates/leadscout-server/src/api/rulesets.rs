//! Ruleset endpoints: read the effective ruleset, overwrite the stored one.
//!
//! Resolution order everywhere scoring happens: stored payload first, then
//! the ruleset file, then built-in defaults. PUT overwrites the stored
//! payload (implicit versioning).

use axum::{extract::State, Extension, Json};
use leadscout_core::IcpRuleset;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

pub(super) const DEFAULT_RULESET_OWNER: &str = "default";

/// Resolves the effective ruleset for scoring.
pub(super) async fn resolve_ruleset(state: &AppState) -> IcpRuleset {
    match leadscout_db::get_ruleset_payload(&state.pool, DEFAULT_RULESET_OWNER).await {
        Ok(Some(payload)) => match serde_json::from_value(payload) {
            Ok(ruleset) => return ruleset,
            Err(e) => {
                tracing::warn!(error = %e, "stored ruleset payload is malformed; falling back");
            }
        },
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stored ruleset; falling back");
        }
    }

    match leadscout_core::load_ruleset_file(&state.config.ruleset_path) {
        Ok(ruleset) => ruleset,
        Err(e) => {
            tracing::warn!(error = %e, "ruleset file unavailable; using built-in defaults");
            IcpRuleset::default()
        }
    }
}

pub async fn get_ruleset(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<IcpRuleset>>, ApiError> {
    let ruleset = resolve_ruleset(&state).await;
    Ok(Json(ApiResponse {
        data: ruleset,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub async fn put_ruleset(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(ruleset): Json<IcpRuleset>,
) -> Result<Json<ApiResponse<IcpRuleset>>, ApiError> {
    let payload = serde_json::to_value(&ruleset).map_err(|e| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("ruleset does not serialize: {e}"),
        )
    })?;
    leadscout_db::upsert_ruleset_payload(&state.pool, DEFAULT_RULESET_OWNER, &payload)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ruleset,
        meta: ResponseMeta::new(req_id.0),
    }))
}
