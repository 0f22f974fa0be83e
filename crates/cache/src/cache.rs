//! The cache façade itself.
//!
//! Wraps a [`redis::Client`] and a lazily-established
//! [`ConnectionManager`]. The manager reconnects on its own and clones
//! cheaply, so a single `Cache` is shared across all requests.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, ExistenceCheck, SetExpiry, SetOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::error::CacheError;

/// Result of a cache-aside lookup: the value (if any) and whether it came
/// from the store or was freshly produced.
#[derive(Debug, Clone, Serialize)]
pub struct Remembered<T> {
    pub value: Option<T>,
    pub cached: bool,
}

/// Cache store over Redis with an instance-level key prefix.
///
/// The effective storage key for every operation is `prefix + logical key`.
/// The network connection is established lazily on first use and reused
/// afterwards (idempotent connect).
pub struct Cache {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    prefix: String,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("prefix", &self.prefix).finish_non_exhaustive()
    }
}

impl Cache {
    /// Creates a cache over the given Redis connection string.
    ///
    /// # Errors
    /// Returns an error if the connection string cannot be parsed. No
    /// network I/O happens here.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        Ok(Self { client, conn: OnceCell::new(), prefix: String::new() })
    }

    /// Sets the key prefix at construction time.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns the current key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Replaces the key prefix for subsequent operations.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// Effective storage key: prefix + logical key.
    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Lazily establishes (once) and clones the managed connection.
    ///
    /// Retries and timeouts are bounded so an unreachable store fails fast
    /// instead of queueing commands indefinitely.
    async fn conn(&self) -> Result<ConnectionManager, CacheError> {
        const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
        const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
        const MAX_RETRIES: usize = 3;

        let manager = self
            .conn
            .get_or_try_init(|| {
                let config = ConnectionManagerConfig::new()
                    .set_connection_timeout(CONNECT_TIMEOUT)
                    .set_response_timeout(RESPONSE_TIMEOUT)
                    .set_number_of_retries(MAX_RETRIES);
                self.client.get_connection_manager_with_config(config)
            })
            .await?;
        Ok(manager.clone())
    }

    /// Retrieve a value, or `None` if the key is absent.
    ///
    /// A missing key is not an error; only store or decode failures are.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(self.key(key)).await?;
        raw.map(|v| serde_json::from_str(&v)).transpose().map_err(CacheError::from)
    }

    /// Retrieve a value, falling back to `default` when absent.
    pub async fn get_or<T: DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, CacheError> {
        Ok(self.get(key).await?.unwrap_or(default))
    }

    /// Store a value with an optional expiry, as a single `SET` command.
    ///
    /// Returns `true` on success. A TTL of `None` or `0` means no expiry.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: Option<u64>,
    ) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        let raw = serde_json::to_string(value)?;
        let cache_key = self.key(key);
        match effective_ttl(ttl_secs) {
            Some(ttl) => conn.set_ex::<_, _, ()>(cache_key, raw, ttl).await?,
            None => conn.set::<_, _, ()>(cache_key, raw).await?,
        }
        Ok(true)
    }

    /// Store a value, then apply the expiry as a separate `EXPIRE` call.
    ///
    /// If the process dies between the two commands the key stays cached
    /// without a TTL. Prefer [`Cache::set`] unless this two-step shape is
    /// required; it is kept for callers that adjust TTLs independently.
    pub async fn put<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: Option<u64>,
    ) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        let raw = serde_json::to_string(value)?;
        let cache_key = self.key(key);
        conn.set::<_, _, ()>(&cache_key, raw).await?;
        if let Some(ttl) = effective_ttl(ttl_secs) {
            conn.expire::<_, ()>(&cache_key, ttl as i64).await?;
        }
        Ok(true)
    }

    /// Cache-aside lookup: return the cached value, or invoke `producer`,
    /// store its result under `key`, and return it.
    ///
    /// Every failure along the way (lookup, production, write-back) is
    /// logged and resolved as `{ value: None, cached: false }` — under
    /// store failure, read-through caching degrades to always-recompute
    /// rather than propagating the error. Callers whose producer may
    /// legitimately yield no value cannot distinguish that from an error.
    ///
    /// Concurrent misses on the same key each run the producer; no
    /// in-flight de-duplication is attempted.
    pub async fn remember<T, F, Fut>(
        &self,
        key: &str,
        producer: F,
        ttl_secs: Option<u64>,
    ) -> Remembered<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self.get::<T>(key).await {
            Ok(Some(value)) => return Remembered { value: Some(value), cached: true },
            Ok(None) => {},
            Err(e) => {
                tracing::error!(key, error = %e, "cache lookup failed, recomputing");
            },
        }

        let produced = match producer().await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key, error = %e, "cache producer failed");
                return Remembered { value: None, cached: false };
            },
        };

        if let Err(e) = self.set(key, &produced, ttl_secs).await {
            tracing::error!(key, error = %e, "cache write-back failed");
        }
        Remembered { value: Some(produced), cached: false }
    }

    /// [`Cache::remember`] with no expiry.
    pub async fn remember_forever<T, F, Fut>(&self, key: &str, producer: F) -> Remembered<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.remember(key, producer, None).await
    }

    /// Atomically increment a numeric key, returning the new value.
    pub async fn increment(&self, key: &str, by: i64) -> Result<i64, CacheError> {
        let mut conn = self.conn().await?;
        Ok(conn.incr(self.key(key), by).await?)
    }

    /// Atomically decrement a numeric key, returning the new value.
    pub async fn decrement(&self, key: &str, by: i64) -> Result<i64, CacheError> {
        let mut conn = self.conn().await?;
        Ok(conn.decr(self.key(key), by).await?)
    }

    /// Whether the key exists.
    pub async fn has(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        Ok(conn.exists(self.key(key)).await?)
    }

    /// Logical negation of [`Cache::has`].
    pub async fn missing(&self, key: &str) -> Result<bool, CacheError> {
        Ok(!self.has(key).await?)
    }

    /// Set-if-absent: stores the value and returns `true` only when the key
    /// did not exist. Uses the store's native conditional set (`SET NX`),
    /// so it is atomic under concurrent callers.
    pub async fn add<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: Option<u64>,
    ) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        let raw = serde_json::to_string(value)?;
        let mut opts = SetOptions::default().conditional_set(ExistenceCheck::NX);
        if let Some(ttl) = effective_ttl(ttl_secs) {
            opts = opts.with_expiration(SetExpiry::EX(ttl));
        }
        let res: Option<String> = conn.set_options(self.key(key), raw, opts).await?;
        Ok(res.is_some())
    }

    /// Get-then-delete, atomic via `GETDEL`. Returns the removed value, or
    /// `None` if the key was absent.
    pub async fn pull<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get_del(self.key(key)).await?;
        raw.map(|v| serde_json::from_str(&v)).transpose().map_err(CacheError::from)
    }

    /// Batch read: absent keys map to a clone of `default`.
    pub async fn get_multiple<T: DeserializeOwned + Clone>(
        &self,
        keys: &[&str],
        default: T,
    ) -> Result<HashMap<String, T>, CacheError> {
        let raw = self.mget(keys).await?;
        let mut results = HashMap::with_capacity(keys.len());
        for (key, value) in keys.iter().zip(raw) {
            let decoded = match value {
                Some(v) => serde_json::from_str(&v)?,
                None => default.clone(),
            };
            results.insert((*key).to_owned(), decoded);
        }
        Ok(results)
    }

    /// Batch read with per-key defaults: absent keys map to the default
    /// supplied alongside them.
    pub async fn many<T: DeserializeOwned>(
        &self,
        keys_with_defaults: HashMap<String, Option<T>>,
    ) -> Result<HashMap<String, Option<T>>, CacheError> {
        let keys: Vec<String> = keys_with_defaults.keys().cloned().collect();
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let raw = self.mget(&key_refs).await?;

        let mut defaults = keys_with_defaults;
        let mut results = HashMap::with_capacity(keys.len());
        for (key, value) in keys.iter().zip(raw) {
            let decoded = match value {
                Some(v) => Some(serde_json::from_str(&v)?),
                None => defaults.remove(key.as_str()).flatten(),
            };
            results.insert(key.clone(), decoded);
        }
        Ok(results)
    }

    /// Batch write; succeeds only if every individual write succeeds.
    pub async fn put_many<T: Serialize>(
        &self,
        values: &HashMap<String, T>,
        ttl_secs: Option<u64>,
    ) -> Result<bool, CacheError> {
        let mut all_ok = true;
        for (key, value) in values {
            all_ok &= self.put(key, value, ttl_secs).await?;
        }
        Ok(all_ok)
    }

    /// Remaining time-to-live in seconds. Redis sentinel semantics: `-2`
    /// when the key is absent, `-1` when it has no expiry.
    pub async fn ttl(&self, key: &str) -> Result<i64, CacheError> {
        let mut conn = self.conn().await?;
        Ok(conn.ttl(self.key(key)).await?)
    }

    /// Remove a key. Returns `true` if the key existed.
    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        let removed: i64 = conn.del(self.key(key)).await?;
        Ok(removed == 1)
    }

    /// Alias of [`Cache::delete`].
    pub async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        self.delete(key).await
    }

    /// Remove several keys; `true` only when every key existed.
    pub async fn delete_multiple(&self, keys: &[&str]) -> Result<bool, CacheError> {
        let mut all_ok = true;
        for key in keys {
            all_ok &= self.delete(key).await?;
        }
        Ok(all_ok)
    }

    /// Remove ALL entries in the selected logical database. Destructive and
    /// unscoped: never expose this on a store shared across tenants unless
    /// the database index isolates them.
    pub async fn flush(&self) -> Result<bool, CacheError> {
        let mut conn = self.conn().await?;
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        Ok(true)
    }

    /// Alias of [`Cache::flush`].
    pub async fn clear(&self) -> Result<bool, CacheError> {
        self.flush().await
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>, CacheError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn().await?;
        let cache_keys: Vec<String> = keys.iter().map(|k| self.key(k)).collect();
        Ok(conn.mget(cache_keys).await?)
    }
}

/// Normalizes a TTL: `None` or `0` means no expiry.
fn effective_ttl(ttl_secs: Option<u64>) -> Option<u64> {
    ttl_secs.filter(|&ttl| ttl > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache(prefix: &str) -> Cache {
        Cache::new("redis://127.0.0.1:6379/15").expect("valid url").with_prefix(prefix)
    }

    #[test]
    fn test_key_prefixing() {
        let cache = test_cache("app:");
        assert_eq!(cache.key("users"), "app:users");
        assert_eq!(cache.prefix(), "app:");
    }

    #[test]
    fn test_empty_prefix_is_identity() {
        let cache = test_cache("");
        assert_eq!(cache.key("users"), "users");
    }

    #[test]
    fn test_set_prefix_replaces() {
        let mut cache = test_cache("a:");
        cache.set_prefix("b:");
        assert_eq!(cache.key("k"), "b:k");
    }

    #[test]
    fn test_effective_ttl_zero_means_no_expiry() {
        assert_eq!(effective_ttl(None), None);
        assert_eq!(effective_ttl(Some(0)), None);
        assert_eq!(effective_ttl(Some(30)), Some(30));
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(Cache::new("not a url").is_err());
    }
}
