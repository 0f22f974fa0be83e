#[cfg(test)]
mod tests {
    use crate::client::LlmClient;
    use crate::error::LlmError;
    use crate::types::{ChatMessage, ChatRequest};
    use futures_util::StreamExt as _;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_request() -> ChatRequest {
        ChatRequest::new("test-model", vec![ChatMessage::user("hello")])
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let server = MockServer::start().await;
        let client = LlmClient::new("test-key".to_owned(), server.uri()).expect("client");
        let request = create_test_request();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content": "test response",
                        "role": "assistant"
                    }
                }]
            })))
            .mount(&server)
            .await;

        let result = client.chat_completion(&request).await.unwrap();
        assert_eq!(result, "test response");
    }

    #[tokio::test]
    async fn test_retry_on_429_then_success() {
        let server = MockServer::start().await;
        let client = LlmClient::new("test-key".to_owned(), server.uri()).expect("client");
        let request = create_test_request();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content": "success after retry",
                        "role": "assistant"
                    }
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let result = client.chat_completion(&request).await.unwrap();
        assert_eq!(result, "success after retry");
    }

    #[tokio::test]
    async fn test_non_transient_status_fails_immediately() {
        let server = MockServer::start().await;
        let client = LlmClient::new("test-key".to_owned(), server.uri()).expect("client");

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.chat_completion(&create_test_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::HttpStatus { code: 401, .. }));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        let client = LlmClient::new("test-key".to_owned(), server.uri()).expect("client");

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = client.chat_completion(&create_test_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_chat_stream_yields_deltas_until_done() {
        let server = MockServer::start().await;
        let client = LlmClient::new("test-key".to_owned(), server.uri()).expect("client");

        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{}}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body, "text/event-stream"),
            )
            .mount(&server)
            .await;

        let stream = client.chat_stream(create_test_request());
        let fragments: Vec<String> =
            stream.map(|item| item.expect("stream item")).collect().await;
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_chat_stream_raw_relays_whole_chunks() {
        let server = MockServer::start().await;
        let client = LlmClient::new("test-key".to_owned(), server.uri()).expect("client");

        let role_chunk = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        let text_chunk = r#"{"choices":[{"delta":{"content":"Hi"}}]}"#;
        let finish_chunk = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let body = format!(
            "data: {role_chunk}\n\ndata: {text_chunk}\n\ndata: {finish_chunk}\n\ndata: [DONE]\n\n"
        );
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let stream = client.chat_stream_raw(create_test_request());
        let payloads: Vec<String> =
            stream.map(|item| item.expect("stream item")).collect().await;
        // metadata and empty-delta chunks pass through untouched
        assert_eq!(payloads, vec![role_chunk, text_chunk, finish_chunk]);
    }

    #[tokio::test]
    async fn test_chat_stream_surfaces_http_errors() {
        let server = MockServer::start().await;
        let client = LlmClient::new("test-key".to_owned(), server.uri()).expect("client");

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let stream = client.chat_stream(create_test_request());
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(LlmError::HttpStatus { code: 500, .. })));
    }
}
