//! Query-string shapes. Numeric parameters arrive as raw strings and are
//! coerced downstream, so invalid input degrades to defaults instead of a
//! 400.

use serde::Deserialize;

/// `GET /users` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    /// Substring to match against user names, case-insensitively.
    pub query: Option<String>,
}

/// `?type=` provider selector used by the AI endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub provider: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_query_wire_names() {
        let query: UsersQuery =
            serde_urlencoded_from_str("page=2&pageSize=5&query=ada").expect("valid query");
        assert_eq!(query.page.as_deref(), Some("2"));
        assert_eq!(query.page_size.as_deref(), Some("5"));
        assert_eq!(query.query.as_deref(), Some("ada"));
    }

    #[test]
    fn test_users_query_all_optional() {
        let query: UsersQuery = serde_urlencoded_from_str("").expect("empty query");
        assert!(query.page.is_none());
        assert!(query.page_size.is_none());
        assert!(query.query.is_none());
    }

    #[test]
    fn test_type_query_rename() {
        let query: TypeQuery =
            serde_urlencoded_from_str("type=deepseek").expect("valid query");
        assert_eq!(query.provider.as_deref(), Some("deepseek"));
    }

    // axum's Query extractor is urlencoded under the hood; going through
    // serde_json keeps the test free of an extra dev-dependency.
    fn serde_urlencoded_from_str<T: serde::de::DeserializeOwned>(
        raw: &str,
    ) -> Result<T, serde_json::Error> {
        let mut map = serde_json::Map::new();
        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            map.insert(k.to_owned(), serde_json::Value::String(v.to_owned()));
        }
        serde_json::from_value(serde_json::Value::Object(map))
    }
}
