use thiserror::Error;

/// Errors from database operations.
///
/// The pagination builder propagates these uncaught — it composes queries,
/// it does not retry them.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
