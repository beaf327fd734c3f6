//! Company read/write endpoints. Lookup is by name; the normalized form
//! is the identity key, so `Acme Corp` and `acme   corp` hit the same row.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use leadscout_core::{normalize_company_name, SignalCounts, SignalSnapshot};
use leadscout_db::{CompanyPatch, CompanyRow};
use leadscout_engine::reconcile;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub struct CompanyItem {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub industry: Option<String>,
    pub employee_count: Option<String>,
    pub country: Option<String>,
    pub founded_year: Option<i32>,
    pub funding_stage: Option<String>,
    pub funding_amount: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub signals: SignalSnapshot,
    pub signal_counts: SignalCounts,
    pub extracted_info: Option<serde_json::Value>,
    pub icp_score: Option<i32>,
    pub icp_tier: Option<String>,
    pub icp_breakdown: Option<serde_json::Value>,
    pub icp_scored_at: Option<DateTime<Utc>>,
    pub lead_grade: Option<String>,
    pub lead_score: Option<i32>,
    pub last_scanned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CompanyRow> for CompanyItem {
    fn from(row: CompanyRow) -> Self {
        let signals: SignalSnapshot = row
            .signal_snapshot
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        let signal_counts = signals.counts();
        Self {
            id: row.id,
            public_id: row.public_id,
            name: row.name,
            normalized_name: row.normalized_name,
            industry: row.industry,
            employee_count: row.employee_count,
            country: row.country,
            founded_year: row.founded_year,
            funding_stage: row.funding_stage,
            funding_amount: row.funding_amount,
            description: row.description,
            notes: row.notes,
            signals,
            signal_counts,
            extracted_info: row.extracted_info,
            icp_score: row.icp_score,
            icp_tier: row.icp_tier,
            icp_breakdown: row.icp_breakdown,
            icp_scored_at: row.icp_scored_at,
            lead_grade: row.lead_grade,
            lead_score: row.lead_score,
            last_scanned_at: row.last_scanned_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

pub async fn list_companies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<CompanyItem>>>, ApiError> {
    let limit = normalize_limit(params.limit);
    let rows = leadscout_db::list_companies(&state.pool, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(CompanyItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub async fn get_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<CompanyItem>>, ApiError> {
    let normalized = normalize_company_name(&name);
    let row = leadscout_db::get_company_by_normalized_name(&state.pool, &normalized)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("company not found: {name}"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: CompanyItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Manual save body. Absent or unknown-valued fields keep stored values;
/// the merge policy applies to manual edits exactly as it does to research.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCompanyBody {
    pub industry: Option<String>,
    pub employee_count: Option<String>,
    pub country: Option<String>,
    pub founded_year: Option<i32>,
    pub funding_stage: Option<String>,
    pub funding_amount: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

pub async fn update_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
    Json(body): Json<UpdateCompanyBody>,
) -> Result<Json<ApiResponse<CompanyItem>>, ApiError> {
    let normalized = normalize_company_name(&name);
    let row = leadscout_db::get_company_by_normalized_name(&state.pool, &normalized)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("company not found: {name}"),
            )
        })?;

    let patch = CompanyPatch {
        industry: body.industry.as_deref().and_then(reconcile::known),
        employee_count: body.employee_count.as_deref().and_then(reconcile::known),
        country: body.country.as_deref().and_then(reconcile::known),
        founded_year: body.founded_year,
        funding_stage: body.funding_stage.as_deref().and_then(reconcile::known),
        funding_amount: body.funding_amount.as_deref().and_then(reconcile::known),
        description: body.description.as_deref().and_then(reconcile::known),
        notes: body.notes.as_deref().and_then(reconcile::known),
    };

    let updated = leadscout_db::update_company_fields(&state.pool, row.id, patch)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: CompanyItem::from(updated),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub struct DeletedData {
    pub deleted: bool,
}

pub async fn delete_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<DeletedData>>, ApiError> {
    let normalized = normalize_company_name(&name);
    let row = leadscout_db::get_company_by_normalized_name(&state.pool, &normalized)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("company not found: {name}"),
            )
        })?;

    let deleted = leadscout_db::delete_company(&state.pool, row.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: DeletedData {
            deleted: deleted > 0,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
