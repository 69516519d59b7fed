//! Anthropic client tests against a mock Messages API

use mockito::{Matcher, Server, ServerGuard};
use optimed::adapters::anthropic::AnthropicClient;
use optimed::config::{secret_string, AnthropicConfig};
use optimed::core::ports::LlmClient;
use optimed::domain::{ChatMessage, ChatRole, LlmError, OptimedError};
use serde_json::json;

fn client_for(server: &ServerGuard) -> AnthropicClient {
    let config = AnthropicConfig {
        base_url: server.url(),
        api_key: Some(secret_string("sk-test".to_string())),
        model: "claude-test".to_string(),
        ..Default::default()
    };
    AnthropicClient::new(config).unwrap()
}

fn reply_body(text: &str) -> String {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-test",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 12, "output_tokens": 4}
    })
    .to_string()
}

#[tokio::test]
async fn test_chat_round_trip() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "sk-test")
        .match_header("anthropic-version", "2023-06-01")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-test",
            "max_tokens": 4096,
            "system": "You are terse.",
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("Hello from stub"))
        .create_async()
        .await;

    let transcript = [ChatMessage::system("You are terse."), ChatMessage::user("Hello")];
    let reply = client_for(&server)
        .chat(&transcript, 0.7, None)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(reply.role(), ChatRole::Assistant);
    assert_eq!(reply.content(), "Hello from stub");
    assert_eq!(reply.metadata_value("model"), Some("claude-test"));
    assert_eq!(reply.metadata_value("response_id"), Some("msg_01"));
    assert_eq!(reply.metadata_value("input_tokens"), Some("12"));
    assert_eq!(reply.metadata_value("output_tokens"), Some("4"));
}

#[tokio::test]
async fn test_max_tokens_override_is_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({"max_tokens": 64})))
        .with_status(200)
        .with_body(reply_body("ok"))
        .create_async()
        .await;

    client_for(&server)
        .chat(&[ChatMessage::user("hi")], 0.0, Some(64))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_late_system_message_is_not_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .expect(0)
        .create_async()
        .await;

    let transcript = [ChatMessage::user("hi"), ChatMessage::system("late")];
    let err = client_for(&server)
        .chat(&transcript, 0.5, None)
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, OptimedError::Llm(LlmError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_status_mapping() {
    let cases: [(usize, &str); 5] = [
        (401, "authentication"),
        (403, "authentication"),
        (429, "rate limit"),
        (529, "server"),
        (400, "client"),
    ];

    for (status, kind) in cases {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(status)
            .with_header("retry-after", "30")
            .with_body(
                json!({"type": "error", "error": {"type": "some_error", "message": "nope"}})
                    .to_string(),
            )
            .create_async()
            .await;

        let err = client_for(&server)
            .chat(&[ChatMessage::user("hi")], 0.5, None)
            .await
            .unwrap_err();

        let OptimedError::Llm(llm) = err else {
            panic!("expected LLM error for {status}");
        };
        match (kind, llm) {
            ("authentication", LlmError::AuthenticationFailed(msg)) => assert_eq!(msg, "nope"),
            ("rate limit", LlmError::RateLimitExceeded(retry)) => assert_eq!(retry, "30"),
            ("server", LlmError::ServerError { status: s, message }) => {
                assert_eq!(s as usize, status);
                assert_eq!(message, "nope");
            }
            ("client", LlmError::ClientError { status: s, .. }) => assert_eq!(s as usize, status),
            (kind, other) => panic!("status {status}: expected {kind}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client_for(&server)
        .chat(&[ChatMessage::user("hi")], 0.5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, OptimedError::Llm(LlmError::InvalidResponse(_))));
}
