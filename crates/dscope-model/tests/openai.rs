//! Chat-completions client against a wiremock server.

use dscope_model::{CompletionRequest, ModelError, ModelService, OpenAiClient, OpenAiConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiClient {
    let mut config = OpenAiConfig::new("sk-test", "gpt-4o");
    config.base_url = format!("{}/v1", server.uri());
    OpenAiClient::new(config).expect("client construction should not fail")
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn sends_json_mode_request_and_returns_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "response_format": { "type": "json_object" },
            "temperature": 0.0,
            "messages": [
                { "role": "system", "content": "You output strict JSON only." },
                { "role": "user", "content": "{\"a\":1}" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"ok\":true}")))
        .expect(1)
        .mount(&server)
        .await;

    let request = CompletionRequest::new("You output strict JSON only.", "{\"a\":1}", 0.0);
    let content = client(&server).complete_json(&request).await.unwrap();
    assert_eq!(content, "{\"ok\":true}");
}

#[tokio::test]
async fn fenced_content_is_unwrapped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("```json\n{\"status\":\"success\"}\n```")),
        )
        .mount(&server)
        .await;

    let request = CompletionRequest::new("system", "user", 0.1);
    let content = client(&server).complete_json(&request).await.unwrap();
    assert_eq!(content, "{\"status\":\"success\"}");
}

#[tokio::test]
async fn non_success_status_carries_upstream_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached for gpt-4o", "type": "requests" }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete_json(&CompletionRequest::new("s", "u", 0.1))
        .await
        .unwrap_err();
    match err {
        ModelError::Status { status, ref message } => {
            assert_eq!(status, 429);
            assert!(message.contains("Rate limit"), "{message}");
        }
        ref other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_content_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete_json(&CompletionRequest::new("s", "u", 0.4))
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::EmptyResponse));
}

#[tokio::test]
async fn unreadable_envelope_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete_json(&CompletionRequest::new("s", "u", 0.1))
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Deserialize { .. }));
}
