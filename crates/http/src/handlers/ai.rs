//! `GET /ai` — streams a canned demonstration prompt through the selected
//! provider as SSE.

use std::convert::Infallible;
use std::sync::Arc;

use async_stream::stream;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt as _;
use futures_util::pin_mut;
use tazeai_llm::{ChatMessage, ChatRequest, render_prompt};

use crate::AppState;
use crate::handlers::sse_json;
use crate::query_types::TypeQuery;
use crate::response_types::{DataEvent, ErrorEvent};

const AI_MODEL: &str = "deepseek-ai/DeepSeek-R1-Distill-Qwen-7B";
const MEANING_PROMPT: &str = "请用简洁的语言描述一下 {topic} 的意义。";
const DEFAULT_TOPIC: &str = "人工智能";
const DEFAULT_PROVIDER: &str = "openai";

/// Streams the model's answer as `{"type":"data","data":...}` events. An
/// unknown or unconfigured provider is rejected as JSON before any SSE
/// bytes are written; a mid-stream failure becomes one terminal
/// `{"error":...}` event.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TypeQuery>,
) -> Response {
    let provider = query.provider.unwrap_or_else(|| DEFAULT_PROVIDER.to_owned());
    let client = match state.llm.resolve(&provider) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(provider = %provider, "ai request rejected");
            return Json(serde_json::json!({ "error": e.to_string() })).into_response();
        },
    };

    let prompt = render_prompt(MEANING_PROMPT, &[("topic", DEFAULT_TOPIC)]);
    let upstream = client.chat_stream(ChatRequest::new(AI_MODEL, vec![ChatMessage::user(prompt)]));

    let events = stream! {
        pin_mut!(upstream);
        while let Some(item) = upstream.next().await {
            match item {
                Ok(fragment) => {
                    yield Ok::<_, Infallible>(sse_json(&DataEvent { kind: "data", data: fragment }));
                },
                Err(e) => {
                    tracing::error!(error = %e, "ai stream failed");
                    yield Ok(sse_json(&ErrorEvent { error: e.to_string() }));
                    break;
                },
            }
        }
    };
    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}
