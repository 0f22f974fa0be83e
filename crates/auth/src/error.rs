use thiserror::Error;

/// Errors from session lookup.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session storage: {0}")]
    Storage(#[from] tazeai_cache::CacheError),

    #[error("database: {0}")]
    Db(#[from] tazeai_db::DbError),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err.into())
    }
}
