//! Router-level tests. Most run fully offline: the pool is lazy, the
//! cache connects on first use, and anonymous requests never touch either.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tazeai_auth::{Auth, CacheSessionStorage};
use tazeai_cache::Cache;
use tazeai_core::Config;
use tazeai_db::Db;
use tazeai_http::{AppState, create_router};
use tazeai_llm::ProviderRegistry;
use tower::ServiceExt as _;

fn router_with_registry(llm: ProviderRegistry) -> Router {
    let db = Db::connect_lazy("postgres://postgres@127.0.0.1:5432/tazeai_test")
        .expect("lazy pool");
    let cache = Arc::new(Cache::new("redis://127.0.0.1:6379/15").expect("valid url"));
    let storage = Arc::new(CacheSessionStorage::new(Arc::clone(&cache)));
    let auth = Auth::new(storage, db.clone(), 3600);
    create_router(Arc::new(AppState { db, cache, auth, llm }))
}

fn offline_router() -> Router {
    router_with_registry(ProviderRegistry::empty())
}

/// A registry with only DeepSeek configured, pointed at `base_url`.
fn deepseek_only_registry(base_url: &str) -> ProviderRegistry {
    let vars = std::collections::HashMap::from([
        ("DATABASE_URL".to_owned(), "postgres://localhost/ignored".to_owned()),
        ("REDIS_URL".to_owned(), "redis://127.0.0.1:6379/15".to_owned()),
        ("DEEPSEEK_API_KEY".to_owned(), "sk-test".to_owned()),
        ("DEEPSEEK_PROXY_URL".to_owned(), base_url.to_owned()),
    ]);
    let lookup = move |var: &str| vars.get(var).cloned();
    let config = Config::from_lookup(&lookup).expect("valid config");
    ProviderRegistry::from_config(&config).expect("registry")
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("finite body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// The `data:` payloads of an SSE body.
fn sse_payloads(body: &str) -> Vec<&str> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .filter(|payload| !payload.is_empty())
        .collect()
}

#[tokio::test]
async fn test_health_returns_ok() {
    let response = offline_router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["message"], "OK");
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let response = offline_router()
        .oneshot(Request::builder().uri("/no/such/route").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn test_completions_unknown_provider_yields_one_error_event() {
    let request = Request::builder()
        .method("POST")
        .uri("/langchain/completions?type=claude")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"model":"m","prompt":"hello"}"#))
        .unwrap();
    let response = offline_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned();
    assert!(content_type.starts_with("text/event-stream"), "got {content_type}");

    let body = body_string(response).await;
    let payloads = sse_payloads(&body);
    assert_eq!(payloads.len(), 1, "expected exactly one event, body: {body}");
    let event: serde_json::Value = serde_json::from_str(payloads[0]).unwrap();
    assert_eq!(
        event["error"],
        "An error occurred while processing your request:Model not found"
    );
}

#[tokio::test]
async fn test_completions_unconfigured_provider_yields_same_error() {
    // "openai" is a known name, just not configured in this registry.
    let request = Request::builder()
        .method("POST")
        .uri("/langchain/completions?type=openai")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"model":"m","prompt":"hello"}"#))
        .unwrap();
    let response = offline_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    let payloads = sse_payloads(&body);
    assert_eq!(payloads.len(), 1);
    let event: serde_json::Value = serde_json::from_str(payloads[0]).unwrap();
    assert_eq!(
        event["error"],
        "An error occurred while processing your request:Model not found"
    );
}

#[tokio::test]
async fn test_completions_relays_raw_provider_chunks() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    let role_chunk = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
    let text_chunk = r#"{"choices":[{"delta":{"content":"Hi"}}]}"#;
    let finish_chunk = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
    let upstream_body = format!(
        "data: {role_chunk}\n\ndata: {text_chunk}\n\ndata: {finish_chunk}\n\ndata: [DONE]\n\n"
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(upstream_body, "text/event-stream"))
        .mount(&server)
        .await;

    let router = router_with_registry(deepseek_only_registry(&server.uri()));
    let request = Request::builder()
        .method("POST")
        .uri("/langchain/completions?type=deepseek")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"model":"m","prompt":"hello"}"#))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    // whole chunks pass through verbatim, metadata included
    assert_eq!(sse_payloads(&body), vec![role_chunk, text_chunk, finish_chunk]);
}

#[tokio::test]
async fn test_ai_defaults_to_openai_provider() {
    // only deepseek is configured, so the default must be rejected as
    // "Model not found" before any upstream call is attempted
    let router = router_with_registry(deepseek_only_registry("http://127.0.0.1:9"));
    let response = router
        .oneshot(Request::builder().uri("/ai").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned();
    assert!(content_type.starts_with("application/json"), "got {content_type}");

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "Model not found");
}

#[tokio::test]
async fn test_ai_unknown_provider_is_json_error() {
    let response = offline_router()
        .oneshot(Request::builder().uri("/ai?type=claude").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned();
    assert!(content_type.starts_with("application/json"), "got {content_type}");

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "Model not found");
}

/// End-to-end pagination against a live database.
///
/// Needs Postgres at `TAZEAI_TEST_DATABASE_URL` (default
/// `postgres://postgres@127.0.0.1:5432/tazeai_test`).
#[tokio::test]
#[ignore = "requires a running postgres"]
async fn test_users_pagination_end_to_end() {
    let url = std::env::var("TAZEAI_TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@127.0.0.1:5432/tazeai_test".to_owned());
    let db = Db::connect(&url).await.expect("postgres reachable");
    db.migrate().await.expect("migrations apply");

    sqlx::query("TRUNCATE users CASCADE")
        .execute(db.pool())
        .await
        .expect("truncate");
    for i in 0..12 {
        sqlx::query(
            "INSERT INTO users (id, name, email, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW() - ($4 || ' minutes')::interval, NOW())",
        )
        .bind(uuid::Uuid::new_v4())
        .bind(format!("user-{i:02}"))
        .bind(format!("user-{i:02}@example.com"))
        .bind(i.to_string())
        .execute(db.pool())
        .await
        .expect("insert row");
    }

    let cache = Arc::new(Cache::new("redis://127.0.0.1:6379/15").expect("valid url"));
    let storage = Arc::new(CacheSessionStorage::new(Arc::clone(&cache)));
    let auth = Auth::new(storage, db.clone(), 3600);
    let router =
        create_router(Arc::new(AppState { db, cache, auth, llm: ProviderRegistry::empty() }));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/users?page=2&pageSize=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["lastPage"], 3);
    assert_eq!(body["pagination"]["perPage"], 5);
    assert_eq!(body["total"], 12);
    // newest first: page 2 starts at the sixth-newest row
    assert_eq!(body["data"][0]["name"], "user-05");
    assert_eq!(body["data"][0]["status"], "Active");
}
