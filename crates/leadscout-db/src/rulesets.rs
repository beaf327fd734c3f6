//! Database operations for the `icp_rulesets` table.

use sqlx::PgPool;

use crate::DbError;

/// Returns the stored ruleset payload for `owner`, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_ruleset_payload(
    pool: &PgPool,
    owner: &str,
) -> Result<Option<serde_json::Value>, DbError> {
    let payload = sqlx::query_scalar::<_, serde_json::Value>(
        "SELECT payload FROM icp_rulesets WHERE owner = $1",
    )
    .bind(owner)
    .fetch_optional(pool)
    .await?;
    Ok(payload)
}

/// Inserts or overwrites the ruleset payload for `owner`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_ruleset_payload(
    pool: &PgPool,
    owner: &str,
    payload: &serde_json::Value,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO icp_rulesets (owner, payload) VALUES ($1, $2) \
         ON CONFLICT (owner) DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()",
    )
    .bind(owner)
    .bind(payload)
    .execute(pool)
    .await?;
    Ok(())
}
