//! Liveness and dependency probes.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tazeai_db::User;

use crate::AppState;
use crate::api_error::ApiError;
use crate::response_types::{DbProbeResponse, HealthResponse, RedisProbeResponse};

const REDIS_PROBE_TTL_SECS: u64 = 30;

/// `GET /health` — process liveness, touches no dependency.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { message: "OK" })
}

/// `GET /db` — reads the users table and reports the round-trip time.
pub async fn db_probe(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DbProbeResponse>, ApiError> {
    let start = Instant::now();
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(state.db.pool())
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    let time = start.elapsed().as_millis() as u64;
    Ok(Json(DbProbeResponse { message: "OK", users, time }))
}

/// `GET /redis` — a cache-aside round trip. The probe value is the
/// timestamp of the first hit within the TTL window, so `cached` flips to
/// `true` on repeat calls. Cache failures degrade instead of erroring.
pub async fn redis_probe(State(state): State<Arc<AppState>>) -> Json<RedisProbeResponse> {
    let start = Instant::now();
    let data = state
        .cache
        .remember(
            "redis_status",
            || async { Ok::<_, anyhow::Error>(Utc::now().timestamp_millis()) },
            Some(REDIS_PROBE_TTL_SECS),
        )
        .await;
    let time = start.elapsed().as_millis() as u64;
    Json(RedisProbeResponse { message: "OK", data, time })
}
