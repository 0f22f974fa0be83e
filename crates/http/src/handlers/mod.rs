pub mod ai;
pub mod langchain;
pub mod probes;
pub mod users;

use axum::response::sse::Event;
use serde::Serialize;

/// An SSE event whose `data:` line is the JSON encoding of `value`.
pub(crate) fn sse_json<T: Serialize>(value: &T) -> Event {
    match serde_json::to_string(value) {
        Ok(payload) => Event::default().data(payload),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode SSE payload");
            Event::default().data(r#"{"error":"encoding failure"}"#)
        },
    }
}
