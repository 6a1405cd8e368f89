//! HTTP-level tests for `MistralClient` against a local mock server.

use relay_protocol::{Upstream, UpstreamError};
use relay_upstream::{MistralClient, UpstreamConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> MistralClient {
    MistralClient::new(
        UpstreamConfig::new("test-key")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap()
}

#[tokio::test]
async fn sends_single_user_turn_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({
            "model": "devstral-medium-latest",
            "messages": [{"role": "user", "content": "你好"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).complete("你好").await.unwrap();
    assert_eq!(reply, "Hello!");
}

#[tokio::test]
async fn non_success_status_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("hi").await.unwrap_err();
    match err {
        UpstreamError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_content_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("hi").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Malformed(_)));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("hi").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Malformed(_)));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": [{"message": {"content": "late"}}]}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = MistralClient::new(
        UpstreamConfig::new("test-key")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();
    let err = client.complete("hi").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    // Port 9 (discard) is almost never listening on loopback.
    let client = MistralClient::new(
        UpstreamConfig::new("k")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap();
    let err = client.complete("hi").await.unwrap_err();
    assert!(
        matches!(err, UpstreamError::Transport(_) | UpstreamError::Timeout),
        "got {err:?}"
    );
}

#[tokio::test]
async fn custom_model_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "model": "mistral-small-latest",
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": [{"message": {"content": "ok"}}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = MistralClient::new(
        UpstreamConfig::new("k")
            .with_base_url(server.uri())
            .with_model("mistral-small-latest"),
    )
    .unwrap();
    assert_eq!(client.model(), "mistral-small-latest");
    assert_eq!(client.complete("hi").await.unwrap(), "ok");
}
