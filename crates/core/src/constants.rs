//! Shared constants for the TazeAI gateway.
//!
//! Centralizes magic numbers that would otherwise be duplicated across crates.

/// Default page number when the caller omits or mangles it.
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size when the caller omits or mangles it.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Maximum page size for any paginated query (DoS protection).
pub const MAX_PER_PAGE: i64 = 100;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 8;

/// Default TTL for cached session records, in seconds.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Key prefix for session records in the cache store.
pub const SESSION_KEY_PREFIX: &str = "auth";

/// Outbound LLM request timeout in seconds.
pub const LLM_REQUEST_TIMEOUT_SECS: u64 = 60;
