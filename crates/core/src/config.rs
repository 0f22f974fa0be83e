//! Typed process configuration loaded from environment variables.
//!
//! Required variables fail fast at startup with a [`ConfigError`]; optional
//! ones fall back to documented defaults.

use crate::constants::DEFAULT_SESSION_TTL_SECS;
use crate::env_config::{env_opt, parse_with_default};
use crate::error::ConfigError;

/// Settings for a single outbound LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    /// Base URL override (proxy). `None` means the provider's public API.
    pub base_url: Option<String>,
}

/// Validated process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// Redis connection string.
    pub redis_url: String,
    /// Key prefix applied to every cache entry written by this process.
    pub cache_prefix: String,
    /// Bind address for the HTTP server.
    pub host: String,
    pub port: u16,
    /// TTL for session records in the cache store.
    pub session_ttl_secs: u64,
    pub openai: Option<ProviderConfig>,
    pub deepseek: Option<ProviderConfig>,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` or `REDIS_URL`
    /// is absent or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_opt)
    }

    /// Load configuration through a caller-supplied variable lookup.
    ///
    /// The seam lets tests supply a plain map instead of mutating process
    /// environment (which is unsafe to do concurrently).
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let redis_url = lookup("REDIS_URL").ok_or(ConfigError::Missing("REDIS_URL"))?;

        Ok(Self {
            database_url,
            redis_url,
            cache_prefix: lookup("CACHE_PREFIX").unwrap_or_default(),
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_owned()),
            port: parse_with_default(lookup("PORT"), "PORT", 8787),
            session_ttl_secs: parse_with_default(
                lookup("SESSION_TTL_SECS"),
                "SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL_SECS,
            ),
            openai: provider_from_lookup(lookup, "OPENAI_API_KEY", "OPENAI_PROXY_URL"),
            deepseek: provider_from_lookup(lookup, "DEEPSEEK_API_KEY", "DEEPSEEK_PROXY_URL"),
        })
    }
}

fn provider_from_lookup(
    lookup: &dyn Fn(&str) -> Option<String>,
    key_var: &str,
    url_var: &str,
) -> Option<ProviderConfig> {
    lookup(key_var).map(|api_key| ProviderConfig { api_key, base_url: lookup(url_var) })
}
