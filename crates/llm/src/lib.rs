//! Outbound LLM integration for the TazeAI gateway.
//!
//! A [`ProviderRegistry`] holds one [`LlmClient`] per configured provider
//! (OpenAI, DeepSeek — both speak the OpenAI chat-completions wire format).
//! Responses can be fetched whole or consumed as a stream of text deltas.

mod client;
#[cfg(test)]
mod client_tests;
mod error;
mod provider;
mod sse;
mod types;

pub use client::{LlmClient, truncate};
pub use error::LlmError;
pub use provider::{ProviderRegistry, ProviderType};
pub use sse::SseBuffer;
pub use types::{ChatMessage, ChatRequest, render_prompt};
