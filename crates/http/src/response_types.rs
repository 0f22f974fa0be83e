//! Response body shapes, serialized with the wire field names the console
//! UI expects.

use serde::Serialize;
use tazeai_cache::Remembered;
use tazeai_db::User;
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

/// `GET /db`: the users table plus the round-trip time in milliseconds.
#[derive(Debug, Serialize)]
pub struct DbProbeResponse {
    pub message: &'static str,
    pub users: Vec<User>,
    pub time: u64,
}

/// `GET /redis`: a cache-aside probe value plus the round-trip time.
#[derive(Debug, Serialize)]
pub struct RedisProbeResponse {
    pub message: &'static str,
    pub data: Remembered<i64>,
    pub time: u64,
}

/// A user row shaped for the console listing: derived `status` instead of
/// the raw ban columns, timestamps formatted for display.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub role: Option<String>,
    pub status: &'static str,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            email_verified: user.email_verified,
            image: user.image,
            role: user.role,
            status: if user.banned.unwrap_or(false) { "Banned" } else { "Active" },
            created_at: user.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated_at: user.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// One SSE payload of the `/ai` stream.
#[derive(Debug, Serialize)]
pub struct DataEvent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: String,
}

/// The single terminal SSE payload emitted when a stream cannot be
/// started or dies mid-flight.
#[derive(Debug, Serialize)]
pub struct ErrorEvent {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone as _, Utc};

    fn sample_user(banned: Option<bool>) -> User {
        User {
            id: Uuid::nil(),
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            email_verified: true,
            image: None,
            role: Some("admin".to_owned()),
            banned,
            ban_reason: None,
            ban_expires: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_user_view_formats_timestamps() {
        let view = UserView::from(sample_user(None));
        assert_eq!(view.created_at, "2024-01-02 03:04:05");
        assert_eq!(view.updated_at, "2024-01-02 03:04:05");
    }

    #[test]
    fn test_user_view_status_derivation() {
        assert_eq!(UserView::from(sample_user(Some(true))).status, "Banned");
        assert_eq!(UserView::from(sample_user(Some(false))).status, "Active");
        assert_eq!(UserView::from(sample_user(None)).status, "Active");
    }

    #[test]
    fn test_user_view_serializes_camel_case() {
        let json = serde_json::to_value(UserView::from(sample_user(None))).expect("serializable");
        assert_eq!(json["emailVerified"], true);
        assert_eq!(json["createdAt"], "2024-01-02 03:04:05");
        assert!(json.get("banned").is_none());
    }

    #[test]
    fn test_data_event_wire_shape() {
        let json = serde_json::to_value(DataEvent { kind: "data", data: "hi".to_owned() })
            .expect("serializable");
        assert_eq!(json["type"], "data");
        assert_eq!(json["data"], "hi");
    }
}
