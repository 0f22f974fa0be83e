//! HTTP surface of the TazeAI gateway.
//!
//! Builds the axum router: health and dependency probes, the paginated
//! users listing, and the two SSE endpoints that relay upstream LLM
//! streams. Every request passes through a context middleware that
//! attaches the authenticated session (if any) and the caller's cookie
//! preferences as request extensions.

mod api_error;
mod handlers;
mod middleware;
mod preferences;
mod query_types;
mod response_types;

pub use api_error::ApiError;
pub use middleware::CurrentSession;
pub use preferences::Preferences;

use std::sync::Arc;

use axum::Router;
use axum::http::{StatusCode, Uri};
use axum::response::Json;
use axum::routing::{get, post};
use tazeai_auth::Auth;
use tazeai_cache::Cache;
use tazeai_db::Db;
use tazeai_llm::ProviderRegistry;
use tower_http::cors::CorsLayer;

/// Shared application state, one instance per process.
pub struct AppState {
    pub db: Db,
    pub cache: Arc<Cache>,
    pub auth: Auth,
    pub llm: ProviderRegistry,
}

/// Assemble the full route table over the shared state.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::probes::health))
        .route("/db", get(handlers::probes::db_probe))
        .route("/redis", get(handlers::probes::redis_probe))
        .route("/users", get(handlers::users::list_users))
        .route("/ai", get(handlers::ai::generate))
        .route("/langchain/completions", post(handlers::langchain::completions))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::attach_request_context,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    tracing::debug!(%uri, "route not found");
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "message": "Not Found" })))
}
