//! `POST /langchain/completions` — relays a caller-supplied chat request
//! to the selected provider as SSE.

use std::convert::Infallible;
use std::sync::Arc;

use async_stream::stream;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use futures_util::Stream;
use futures_util::StreamExt as _;
use futures_util::pin_mut;
use tazeai_llm::ChatRequest;

use crate::AppState;
use crate::handlers::sse_json;
use crate::query_types::TypeQuery;
use crate::response_types::ErrorEvent;

/// Relays the provider's chunk payloads verbatim as the event data,
/// metadata chunks included. Every failure — unknown provider, upstream
/// refusal, mid-stream drop — surfaces as exactly one `{"error":...}`
/// event before the stream closes, since SSE headers are committed before
/// the outcome is known.
pub async fn completions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TypeQuery>,
    Json(body): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let provider = query.provider.unwrap_or_default();
    let events = stream! {
        let client = match state.llm.resolve(&provider) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(provider = %provider, "completions request rejected");
                yield Ok::<_, Infallible>(sse_json(&request_error(&e)));
                return;
            },
        };
        let upstream = client.chat_stream_raw(body.normalized());
        pin_mut!(upstream);
        while let Some(item) = upstream.next().await {
            match item {
                Ok(payload) => yield Ok(Event::default().data(payload)),
                Err(e) => {
                    tracing::error!(error = %e, "completions stream failed");
                    yield Ok(sse_json(&request_error(&e)));
                    break;
                },
            }
        }
    };
    Sse::new(events)
}

// No space after the colon: consumers of the original API match on this
// exact string.
fn request_error(err: &dyn std::error::Error) -> ErrorEvent {
    ErrorEvent { error: format!("An error occurred while processing your request:{err}") }
}
