use thiserror::Error;

/// Errors from cache operations.
///
/// Direct methods (`get`, `set`, ...) surface these to the caller;
/// [`crate::Cache::remember`] swallows them and degrades to a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
