use futures_util::Stream;
use futures_util::StreamExt as _;
use tazeai_core::LLM_REQUEST_TIMEOUT_SECS;

use crate::error::LlmError;
use crate::sse::SseBuffer;
use crate::types::{ChatRequest, ChatResponse, StreamChunk};

/// Client for one LLM provider endpoint.
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Creates a new client with the given API key and base URL.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(LLM_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self { client, api_key, base_url })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Send a chat completion request and return the extracted content string.
    ///
    /// # Errors
    /// Returns an error if the HTTP request fails, the API returns a
    /// non-success status, the response body cannot be parsed, or the
    /// choices array is empty. Transient failures retry with backoff.
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<String, LlmError> {
        const MAX_RETRIES: usize = 3;
        const RETRY_DELAYS: [u64; 4] = [0, 1, 2, 4];
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay_secs = RETRY_DELAYS.get(attempt).copied().unwrap_or(4);
                let delay = std::time::Duration::from_secs(delay_secs);
                tokio::time::sleep(delay).await;
                tracing::warn!("LLM retry attempt {attempt}/{MAX_RETRIES} after {delay:?}");
            }

            let response_result = self
                .client
                .post(self.completions_url())
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(request)
                .send()
                .await;

            let response = match response_result {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::HttpRequest(e));
                    continue;
                },
            };

            let status = response.status();
            if status.is_success() {
                let body = match response.text().await {
                    Ok(b) => b,
                    Err(e) => {
                        last_error = Some(LlmError::HttpRequest(e));
                        continue;
                    },
                };

                let chat_response: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
                        context: format!(
                            "chat completion response (body: {})",
                            truncate(&body, 200)
                        ),
                        source: e,
                    })?;

                let first_choice = chat_response.choices.first().ok_or(LlmError::EmptyResponse)?;

                return Ok(first_choice.message.content.clone());
            }

            let status_code = status.as_u16();
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_string());

            let err = LlmError::HttpStatus { code: status_code, body };
            if err.is_transient() {
                last_error = Some(err);
                continue;
            }
            return Err(err);
        }

        Err(LlmError::RetriesExhausted(Box::new(last_error.unwrap_or(LlmError::EmptyResponse))))
    }

    /// Stream a chat completion as the provider's raw chunk payloads.
    ///
    /// Forces `stream: true` on the request and yields the JSON text of
    /// every SSE `data:` line as-is, including role and finish-metadata
    /// chunks. The stream ends at the `[DONE]` marker (not yielded) or
    /// when the body closes; any transport error terminates it with `Err`.
    pub fn chat_stream_raw(
        &self,
        request: ChatRequest,
    ) -> impl Stream<Item = Result<String, LlmError>> + Send + use<> {
        let client = self.client.clone();
        let url = self.completions_url();
        let api_key = self.api_key.clone();
        let mut request = request;
        request.stream = Some(true);

        async_stream::try_stream! {
            let response = client
                .post(&url)
                .header("Authorization", format!("Bearer {api_key}"))
                .json(&request)
                .send()
                .await
                .map_err(LlmError::HttpRequest)?;

            let status = response.status();
            let response = if status.is_success() {
                response
            } else {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read error body".to_string());
                Err(LlmError::HttpStatus { code: status.as_u16(), body })?;
                return;
            };

            let mut body = response.bytes_stream();
            let mut buffer = SseBuffer::new();
            let mut done = false;
            while !done {
                let Some(chunk) = body.next().await else { break };
                let chunk = chunk.map_err(LlmError::HttpRequest)?;
                let text = String::from_utf8_lossy(&chunk);
                for payload in buffer.push(&text) {
                    if payload == "[DONE]" {
                        done = true;
                        break;
                    }
                    yield payload;
                }
            }
        }
    }

    /// Stream a chat completion as text deltas.
    ///
    /// Parses each payload of [`LlmClient::chat_stream_raw`] and yields
    /// the non-empty content fragments; a malformed chunk terminates the
    /// stream with `Err`.
    pub fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> impl Stream<Item = Result<String, LlmError>> + Send + use<> {
        let payloads = self.chat_stream_raw(request);

        async_stream::try_stream! {
            futures_util::pin_mut!(payloads);
            while let Some(payload) = payloads.next().await {
                let payload = payload?;
                let parsed: StreamChunk =
                    serde_json::from_str(&payload).map_err(|e| LlmError::JsonParse {
                        context: format!("stream chunk (payload: {})", truncate(&payload, 200)),
                        source: e,
                    })?;
                let content = parsed
                    .choices
                    .first()
                    .and_then(|choice| choice.delta.content.clone())
                    .unwrap_or_default();
                if !content.is_empty() {
                    yield content;
                }
            }
        }
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello world", 5), "hello");
        assert_eq!(truncate("hi", 5), "hi");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "人工智能";
        let cut = truncate(s, 4);
        assert_eq!(cut, "人");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            LlmClient::new("k".to_owned(), "https://api.example.com/".to_owned()).expect("client");
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.completions_url(), "https://api.example.com/v1/chat/completions");
    }
}
