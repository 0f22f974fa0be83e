//! Session record and the header-to-session read path.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tazeai_db::Db;
use uuid::Uuid;

use crate::error::AuthError;
use crate::storage::SessionStorage;

/// Name of the session cookie set by the identity provider.
const SESSION_COOKIE: &str = "auth.session_token";

/// An authenticated session, as stored by the identity provider.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub active_organization_id: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Session reader: cache store first, relational table as fallback.
pub struct Auth {
    storage: Arc<dyn SessionStorage>,
    db: Db,
    cache_ttl_secs: u64,
}

impl Auth {
    pub fn new(storage: Arc<dyn SessionStorage>, db: Db, cache_ttl_secs: u64) -> Self {
        Self { storage, db, cache_ttl_secs }
    }

    /// Resolve the session for a request, or `None` when the request is
    /// anonymous, the token is unknown, or the session has expired.
    pub async fn get_session(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthError> {
        let Some(token) = extract_token(headers) else {
            return Ok(None);
        };

        let storage_key = format!("session:{token}");
        if let Some(raw) = self.storage.get(&storage_key).await? {
            let session: Session = serde_json::from_str(&raw)?;
            if session.is_expired(Utc::now()) {
                self.storage.delete(&storage_key).await?;
                return Ok(None);
            }
            return Ok(Some(session));
        }

        let session = sqlx::query_as::<_, Session>(
            "SELECT token, user_id, expires_at, ip_address, user_agent, active_organization_id \
             FROM sessions WHERE token = $1",
        )
        .bind(&token)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(session) = session else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            return Ok(None);
        }

        // Warm the secondary storage so the next request skips the table.
        let raw = serde_json::to_string(&session)?;
        if let Err(e) = self.storage.set(&storage_key, &raw, Some(self.cache_ttl_secs)).await {
            tracing::warn!(error = %e, "failed to warm session cache");
        }
        Ok(Some(session))
    }
}

/// Token from `Authorization: Bearer <token>` or the session cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ").filter(|t| !t.is_empty()) {
            return Some(token.to_owned());
        }
    }
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, SESSION_COOKIE))
}

/// Pull one value out of a `Cookie:` header.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k.trim() == name && !v.trim().is_empty()).then(|| v.trim().to_owned())
    })
}
