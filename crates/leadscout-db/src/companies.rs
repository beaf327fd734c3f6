//! Database operations for the `companies` table.
//!
//! Partial updates use `COALESCE($n, col)`: the caller maps unknown/empty
//! values to `NULL` before binding, so a known field is never overwritten
//! by an unknown one (the monotonic-knowledge merge lives at this seam).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row and patch types
// ---------------------------------------------------------------------------

/// A row from the `companies` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyRow {
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
    pub signal_snapshot: Option<serde_json::Value>,
    pub extracted_info: Option<serde_json::Value>,
    pub evidence: Option<serde_json::Value>,
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

const COMPANY_COLUMNS: &str = "id, public_id, name, normalized_name, industry, employee_count, \
     country, founded_year, funding_stage, funding_amount, description, notes, \
     signal_snapshot, extracted_info, evidence, icp_score, icp_tier, icp_breakdown, \
     icp_scored_at, lead_grade, lead_score, last_scanned_at, created_at, updated_at";

/// Field-level patch: `Some(v)` means "this value is known", `None` means
/// "no new knowledge, keep whatever is stored".
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyPatch<'a> {
    pub industry: Option<&'a str>,
    pub employee_count: Option<&'a str>,
    pub country: Option<&'a str>,
    pub founded_year: Option<i32>,
    pub funding_stage: Option<&'a str>,
    pub funding_amount: Option<&'a str>,
    pub description: Option<&'a str>,
    pub notes: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Looks up a company by its normalized name, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_company_by_normalized_name(
    pool: &PgPool,
    normalized_name: &str,
) -> Result<Option<CompanyRow>, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies WHERE normalized_name = $1"
    ))
    .bind(normalized_name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns companies ordered by name, up to `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_companies(pool: &PgPool, limit: i64) -> Result<Vec<CompanyRow>, DbError> {
    let rows = sqlx::query_as::<_, CompanyRow>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Creates a new company row with whatever fields are already known.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including unique
/// constraint violations on `normalized_name`).
pub async fn insert_company(
    pool: &PgPool,
    name: &str,
    normalized_name: &str,
    patch: CompanyPatch<'_>,
) -> Result<CompanyRow, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "INSERT INTO companies \
           (name, normalized_name, industry, employee_count, country, founded_year, \
            funding_stage, funding_amount, description, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {COMPANY_COLUMNS}"
    ))
    .bind(name)
    .bind(normalized_name)
    .bind(patch.industry)
    .bind(patch.employee_count)
    .bind(patch.country)
    .bind(patch.founded_year)
    .bind(patch.funding_stage)
    .bind(patch.funding_amount)
    .bind(patch.description)
    .bind(patch.notes)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Merges known fields onto an existing row (`COALESCE` keeps stored
/// values where the patch has no new knowledge).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `company_id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_company_fields(
    pool: &PgPool,
    company_id: i64,
    patch: CompanyPatch<'_>,
) -> Result<CompanyRow, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "UPDATE companies \
         SET industry       = COALESCE($2, industry), \
             employee_count = COALESCE($3, employee_count), \
             country        = COALESCE($4, country), \
             founded_year   = COALESCE($5, founded_year), \
             funding_stage  = COALESCE($6, funding_stage), \
             funding_amount = COALESCE($7, funding_amount), \
             description    = COALESCE($8, description), \
             notes          = COALESCE($9, notes), \
             updated_at     = NOW() \
         WHERE id = $1 \
         RETURNING {COMPANY_COLUMNS}"
    ))
    .bind(company_id)
    .bind(patch.industry)
    .bind(patch.employee_count)
    .bind(patch.country)
    .bind(patch.founded_year)
    .bind(patch.funding_stage)
    .bind(patch.funding_amount)
    .bind(patch.description)
    .bind(patch.notes)
    .fetch_optional(pool)
    .await?;
    row.ok_or(DbError::NotFound)
}

/// Applies one research run: field merge, signal snapshot, extracted info,
/// evidence corpus, and `last_scanned_at` in a single `UPDATE` (one
/// logical write, per the reconciler contract).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `company_id`, or
/// [`DbError::Sqlx`] if the query fails.
#[allow(clippy::too_many_arguments)] // one bind per research artifact; no sensible grouping
pub async fn apply_research(
    pool: &PgPool,
    company_id: i64,
    patch: CompanyPatch<'_>,
    signal_snapshot: &serde_json::Value,
    extracted_info: &serde_json::Value,
    evidence: &serde_json::Value,
) -> Result<CompanyRow, DbError> {
    let row = sqlx::query_as::<_, CompanyRow>(&format!(
        "UPDATE companies \
         SET industry        = COALESCE($2, industry), \
             employee_count  = COALESCE($3, employee_count), \
             country         = COALESCE($4, country), \
             founded_year    = COALESCE($5, founded_year), \
             funding_stage   = COALESCE($6, funding_stage), \
             funding_amount  = COALESCE($7, funding_amount), \
             description     = COALESCE($8, description), \
             notes           = COALESCE($9, notes), \
             signal_snapshot = $10, \
             extracted_info  = $11, \
             evidence        = $12, \
             last_scanned_at = NOW(), \
             updated_at      = NOW() \
         WHERE id = $1 \
         RETURNING {COMPANY_COLUMNS}"
    ))
    .bind(company_id)
    .bind(patch.industry)
    .bind(patch.employee_count)
    .bind(patch.country)
    .bind(patch.founded_year)
    .bind(patch.funding_stage)
    .bind(patch.funding_amount)
    .bind(patch.description)
    .bind(patch.notes)
    .bind(signal_snapshot)
    .bind(extracted_info)
    .bind(evidence)
    .fetch_optional(pool)
    .await?;
    row.ok_or(DbError::NotFound)
}

/// Overwrites the stored ICP score fields for a company.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_icp_score(
    pool: &PgPool,
    company_id: i64,
    score: i32,
    tier: &str,
    breakdown: &serde_json::Value,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE companies \
         SET icp_score = $2, icp_tier = $3, icp_breakdown = $4, icp_scored_at = NOW(), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(company_id)
    .bind(score)
    .bind(tier)
    .bind(breakdown)
    .execute(pool)
    .await?;
    Ok(())
}

/// Overwrites the stored lead grade for a company.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_lead_grade(
    pool: &PgPool,
    company_id: i64,
    grade: &str,
    score: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE companies \
         SET lead_grade = $2, lead_score = $3, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(company_id)
    .bind(grade)
    .bind(score)
    .execute(pool)
    .await?;
    Ok(())
}

/// Hard-deletes a company. Owned contacts cascade at the schema level.
/// Returns the number of deleted rows (0 or 1).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_company(pool: &PgPool, company_id: i64) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(company_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
