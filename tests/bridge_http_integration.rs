//! Integration tests for HTTP delivery through the dispatch bridge.
//!
//! These tests run the bridge against mock HTTP servers.

use flamingo_bridge::bridge::REASON_TOKEN_MISSING;
use flamingo_bridge::{Config, DispatchBridge, TransportError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_config(server: &MockServer, token: &str) -> Config {
    Config {
        enabled: true,
        endpoint: format!("{}/add", server.uri()),
        token: token.to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_send_posts_token_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add"))
        .and(header("X-Token", "secret"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"url": "https://e.com/a.zip", "save_dir": "/downloads"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "task_id": "g-7"})))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = DispatchBridge::new().expect("bridge should build");
    let outcome = bridge
        .send(&http_config(&server, "secret"), "https://e.com/a.zip", Some(" /downloads "))
        .await
        .expect("send should succeed");

    assert!(outcome.is_ok());
    assert_eq!(outcome.task_id(), Some("g-7"));
}

#[tokio::test]
async fn test_send_omits_blank_save_dir() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"url": "https://e.com/a.zip"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = DispatchBridge::new().expect("bridge should build");
    let outcome = bridge
        .send(&http_config(&server, "t"), "https://e.com/a.zip", Some("   "))
        .await
        .expect("send should succeed");
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn test_send_passes_unknown_fields_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"ok": true, "task_id": 42, "queued": 3})),
        )
        .mount(&server)
        .await;

    let bridge = DispatchBridge::new().expect("bridge should build");
    let outcome = bridge
        .send(&http_config(&server, "t"), "https://e.com/a.zip", None)
        .await
        .expect("send should succeed");

    assert_eq!(outcome.task_id(), Some("42"));
    let value = serde_json::to_value(&outcome).expect("outcome serializes");
    assert_eq!(value["queued"], json!(3));
    assert_eq!(value["ok"], json!(true));
}

#[tokio::test]
async fn test_send_non_2xx_is_error_with_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let bridge = DispatchBridge::new().expect("bridge should build");
    let err = bridge
        .send(&http_config(&server, "t"), "https://e.com/a.zip", None)
        .await
        .expect_err("500 should fail");

    assert!(matches!(err, TransportError::HttpStatus { status: 500, .. }));
    let message = err.to_string();
    assert!(message.contains("500"), "message: {message}");
    assert!(message.contains("boom"), "message: {message}");
}

#[tokio::test]
async fn test_send_error_body_is_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("z".repeat(2_000)))
        .mount(&server)
        .await;

    let bridge = DispatchBridge::new().expect("bridge should build");
    let err = bridge
        .send(&http_config(&server, "t"), "https://e.com/a.zip", None)
        .await
        .expect_err("502 should fail");
    let TransportError::HttpStatus { body, .. } = err else {
        panic!("expected HttpStatus, got {err:?}");
    };
    assert_eq!(body.chars().count(), 400);
}

#[tokio::test]
async fn test_send_non_json_success_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let bridge = DispatchBridge::new().expect("bridge should build");
    let err = bridge
        .send(&http_config(&server, "t"), "https://e.com/a.zip", None)
        .await
        .expect_err("non-JSON should fail");
    assert!(matches!(err, TransportError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_missing_token_skips_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let bridge = DispatchBridge::new().expect("bridge should build");
    let outcome = bridge
        .send(&http_config(&server, "  "), "https://e.com/a.zip", None)
        .await
        .expect("skip is not an error");

    assert!(!outcome.is_ok());
    assert!(outcome.is_skipped());
    assert_eq!(outcome.reason(), Some(REASON_TOKEN_MISSING));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let bridge = DispatchBridge::new().expect("bridge should build");
    let config = Config {
        enabled: true,
        endpoint: "http://127.0.0.1:9/add".into(),
        token: "t".into(),
        ..Config::default()
    };
    let err = bridge
        .send(&config, "https://e.com/a.zip", None)
        .await
        .expect_err("connection should fail");
    assert!(matches!(err, TransportError::Network { .. }));
}

#[tokio::test]
async fn test_ping_hits_health_on_endpoint_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("X-Token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "version": "1.4"})))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = DispatchBridge::new().expect("bridge should build");
    let outcome = bridge
        .ping(&http_config(&server, "secret"))
        .await
        .expect("ping should succeed");
    assert!(outcome.is_ok());
    assert_eq!(outcome.raw()["version"], json!("1.4"));
}
