//! Database operations for the `contacts` table.
//!
//! Contacts exist as owned children of a company; deleting the company
//! cascades at the schema level.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `contacts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactRow {
    pub id: i64,
    pub public_id: Uuid,
    pub company_id: i64,
    pub name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creates a contact owned by `company_id` and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_contact(
    pool: &PgPool,
    company_id: i64,
    name: &str,
    title: Option<&str>,
    email: Option<&str>,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO contacts (company_id, name, title, email) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(company_id)
    .bind(name)
    .bind(title)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Counts contacts owned by `company_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_contacts(pool: &PgPool, company_id: i64) -> Result<i64, DbError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contacts WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}
