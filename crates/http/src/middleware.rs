//! Request context middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tazeai_auth::Session;

use crate::preferences::Preferences;
use crate::AppState;

/// The authenticated session for the current request, if any. Stored as a
/// request extension so handlers can opt in without re-reading headers.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

/// Resolves the session and cookie preferences for every request. A failed
/// session lookup degrades to anonymous rather than failing the request.
pub async fn attach_request_context(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match state.auth.get_session(request.headers()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "session lookup failed, treating as anonymous");
            None
        },
    };
    let preferences = Preferences::from_headers(request.headers());
    request.extensions_mut().insert(CurrentSession(session));
    request.extensions_mut().insert(preferences);
    next.run(request).await
}
