#![allow(clippy::unwrap_used)]
// Integration tests for `GatewayClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use switchsync_api::{
    DeviceErrorKind, Error, GatewayClient, OpenSessionRequest, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GatewayClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = GatewayClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": [data] }))
}

fn open_request() -> OpenSessionRequest<'static> {
    OpenSessionRequest {
        host: "10.0.0.1",
        port: None,
        platform: "nxos",
        username: "admin",
        password: "secret",
    }
}

// ── Session lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_open_session() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions"))
        .and(body_json(json!({
            "host": "10.0.0.1",
            "platform": "nxos",
            "username": "admin",
            "password": "secret"
        })))
        .respond_with(ok(json!({ "session_id": "s-1" })))
        .mount(&server)
        .await;

    let id = client.open_session(&open_request()).await.unwrap();
    assert_eq!(id, "s-1");
}

#[tokio::test]
async fn test_open_session_device_unreachable() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "meta": { "rc": "error", "msg": "no route to host", "kind": "connect" },
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client.open_session(&open_request()).await.unwrap_err();
    assert!(
        matches!(
            err,
            Error::Device {
                kind: DeviceErrorKind::Connect,
                ..
            }
        ),
        "expected connect error, got: {err:?}"
    );
    assert!(err.to_string().contains("no route to host"));
}

#[tokio::test]
async fn test_close_session() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/sessions/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" } })))
        .expect(1)
        .mount(&server)
        .await;

    client.close_session("s-1").await.unwrap();
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_command() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/s-1/command"))
        .and(body_json(json!({ "command": "show interface status" })))
        .respond_with(ok(json!({ "output": "Eth1/1  srv  connected 10 full 1000 --" })))
        .mount(&server)
        .await;

    let out = client
        .send_command("s-1", "show interface status")
        .await
        .unwrap();
    assert!(out.starts_with("Eth1/1"));
}

#[tokio::test]
async fn test_send_config_preserves_line_order() {
    let (server, client) = setup().await;

    let lines = vec![
        "interface Ethernet1/1".to_string(),
        "switchport mode trunk".to_string(),
        "switchport trunk allowed vlan 10".to_string(),
    ];

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/s-1/config"))
        .and(body_json(json!({ "lines": lines })))
        .respond_with(ok(json!({ "output": "" })))
        .expect(1)
        .mount(&server)
        .await;

    client.send_config("s-1", &lines).await.unwrap();
}

#[tokio::test]
async fn test_command_rejected_by_device() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/s-1/command"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "% Invalid input", "kind": "command" },
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client.send_command("s-1", "show bogus").await.unwrap_err();
    assert_eq!(err.device_kind(), Some(DeviceErrorKind::Command));
}

#[tokio::test]
async fn test_commit_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/s-1/commit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "commit check failed", "kind": "commit" },
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client.commit("s-1").await.unwrap_err();
    assert_eq!(err.device_kind(), Some(DeviceErrorKind::Commit));
}

// ── Getters ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_getters() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/s-1/getters"))
        .and(body_json(json!({ "getters": ["get_facts"] })))
        .respond_with(ok(json!({
            "get_facts": { "hostname": "sw1", "vendor": "Cisco", "model": "N9K-C93180YC-EX" }
        })))
        .mount(&server)
        .await;

    let payload = client
        .run_getters("s-1", &["get_facts".to_string()])
        .await
        .unwrap();
    assert_eq!(payload["get_facts"]["vendor"], "Cisco");
}

// ── Gateway-level failures ──────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.open_session(&open_request()).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_gateway_timeout() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/s-1/command"))
        .respond_with(ResponseTemplate::new(504).set_body_string("upstream timed out"))
        .mount(&server)
        .await;

    let err = client.send_command("s-1", "show version").await.unwrap_err();
    assert!(err.is_timeout(), "got: {err:?}");
}

#[tokio::test]
async fn test_non_json_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/sessions/s-1/command"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let err = client.send_command("s-1", "show version").await.unwrap_err();
    assert!(matches!(err, Error::Gateway { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let server = MockServer::start().await;
    let transport =
        TransportConfig::default().with_api_key(secrecy::SecretString::from("k-123".to_string()));
    let client = GatewayClient::new(Url::parse(&server.uri()).unwrap(), &transport).unwrap();

    Mock::given(method("DELETE"))
        .and(path("/api/v1/sessions/s-9"))
        .and(header("X-API-KEY", "k-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" } })))
        .expect(1)
        .mount(&server)
        .await;

    client.close_session("s-9").await.unwrap();
}
