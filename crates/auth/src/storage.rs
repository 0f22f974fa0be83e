//! Secondary storage: the key-value contract the identity library uses to
//! persist session state outside the relational database.

use std::sync::Arc;

use async_trait::async_trait;
use tazeai_cache::Cache;
use tazeai_core::{DEFAULT_SESSION_TTL_SECS, SESSION_KEY_PREFIX};

use crate::error::AuthError;

/// Raw string key-value storage with TTL.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError>;
    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), AuthError>;
    async fn delete(&self, key: &str) -> Result<(), AuthError>;
}

/// [`SessionStorage`] over the shared [`Cache`], namespaced under an
/// `auth:` prefix with a default one-hour TTL.
pub struct CacheSessionStorage {
    cache: Arc<Cache>,
    prefix: String,
    default_ttl_secs: u64,
}

impl CacheSessionStorage {
    pub fn new(cache: Arc<Cache>) -> Self {
        Self {
            cache,
            prefix: SESSION_KEY_PREFIX.to_owned(),
            default_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.default_ttl_secs = ttl_secs;
        self
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait]
impl SessionStorage for CacheSessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.cache.get(&self.key(key)).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), AuthError> {
        let ttl = ttl_secs.unwrap_or(self.default_ttl_secs);
        self.cache.set(&self.key(key), &value, Some(ttl)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AuthError> {
        self.cache.delete(&self.key(key)).await?;
        Ok(())
    }
}
