use thiserror::Error;

/// Errors surfaced by the engine pipeline.
///
/// Only caller mistakes and storage-read failures are errors; upstream
/// search/extraction failures degrade into warnings on the outcome instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("company not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Db(#[from] leadscout_db::DbError),
}
