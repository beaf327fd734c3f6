//! Integration tests for `CompletionClient` using wiremock HTTP mocks.

use leadscout_llm::{CompletionClient, LlmError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CompletionClient {
    CompletionClient::with_base_url(Some("test-key"), "test-model", 30, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn complete_returns_message_content() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "choices": [
            {"message": {"role": "assistant", "content": "{\"description\": \"A company\"}"}}
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({"model": "test-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let text = client
        .complete("You extract JSON.", "Tell me about Acme.")
        .await
        .expect("should return completion text");

    assert_eq!(text, "{\"description\": \"A company\"}");
}

#[tokio::test]
async fn missing_api_key_is_a_typed_error() {
    let client = CompletionClient::with_base_url(None, "test-model", 5, "http://127.0.0.1:1")
        .expect("client construction should not fail");
    let result = client.complete("sys", "user").await;
    assert!(matches!(result, Err(LlmError::MissingApiKey)));
}

#[tokio::test]
async fn api_error_envelope_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"message": "context length exceeded", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.complete("sys", "user").await;
    assert!(
        matches!(result, Err(LlmError::ApiError(ref msg)) if msg == "context length exceeded")
    );
}

#[tokio::test]
async fn empty_choices_is_a_typed_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.complete("sys", "user").await;
    assert!(matches!(result, Err(LlmError::EmptyResponse)));
}

#[tokio::test]
async fn non_json_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway error</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.complete("sys", "user").await;
    assert!(matches!(result, Err(LlmError::Deserialize { .. })));
}
