#![allow(clippy::unwrap_used)]
// Integration tests for `BackendClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use homedeck_api::types::RawId;
use homedeck_api::{BackendClient, ControlRequest, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let client =
        BackendClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new())
            .unwrap();
    (server, client)
}

fn token() -> SecretString {
    SecretString::from("long-lived-token".to_string())
}

fn light_json(state: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "entity_id": "light.living_room",
        "domain": "light",
        "name": "Living Room",
        "device_type": "light",
        "state": state,
        "attributes": { "brightness": 120 },
        "last_updated": "2024-06-15T10:30:00Z"
    })
}

// ── Hub configuration ───────────────────────────────────────────────

#[tokio::test]
async fn test_get_hub_config() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/config/home-assistant"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "url": "http://192.168.1.5:8123", "token": "abc" })),
        )
        .mount(&server)
        .await;

    let cfg = client.hub_config().await.unwrap();

    assert_eq!(cfg.url.as_deref(), Some("http://192.168.1.5:8123"));
    assert_eq!(cfg.token.unwrap().expose_secret(), "abc");
}

#[tokio::test]
async fn test_save_hub_config_sends_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/config/home-assistant"))
        .and(body_json(json!({
            "url": "http://192.168.1.5:8123",
            "token": "long-lived-token"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "config": { "url": "http://192.168.1.5:8123" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let saved = client
        .save_hub_config("http://192.168.1.5:8123", &token())
        .await
        .unwrap();

    assert_eq!(
        saved.config.and_then(|c| c.url).as_deref(),
        Some("http://192.168.1.5:8123")
    );
}

#[tokio::test]
async fn test_test_connection_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/config/home-assistant/test"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .test_hub_connection("http://hub:8123", &token())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_hub_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/config/home-assistant/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "configured": true,
            "connected": false,
            "url": "http://hub:8123"
        })))
        .mount(&server)
        .await;

    let status = client.hub_status().await.unwrap();

    assert!(status.configured);
    assert!(!status.connected);
    assert_eq!(status.url.as_deref(), Some("http://hub:8123"));
}

#[tokio::test]
async fn test_restart_hub_link() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/config/home-assistant/websocket/restart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.restart_hub_link().await.unwrap();
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            light_json("off"),
            { "id": "2", "entity_id": "sensor.kitchen_temp", "state": "21.5" }
        ])))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, RawId::Number(1));
    assert_eq!(devices[0].entity_id, "light.living_room");
    assert_eq!(devices[0].state.as_deref(), Some("off"));
    assert_eq!(devices[1].id, RawId::Text("2".into()));
    assert!(devices[1].domain.is_none());
}

#[tokio::test]
async fn test_get_device_and_state() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(light_json("off")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/devices/1/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(light_json("on")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/devices/entity/light.living_room/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(light_json("on")))
        .mount(&server)
        .await;

    assert_eq!(client.get_device("1").await.unwrap().state.as_deref(), Some("off"));
    assert_eq!(client.device_state("1").await.unwrap().state.as_deref(), Some("on"));
    assert_eq!(
        client
            .entity_state("light.living_room")
            .await
            .unwrap()
            .state
            .as_deref(),
        Some("on")
    );
}

#[tokio::test]
async fn test_delete_device_accepts_no_content() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/devices/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_device("1").await.unwrap();
}

#[tokio::test]
async fn test_discover_and_sync_triggers() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "discovered": 3 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/devices/sync"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.discover_devices().await.unwrap();
    client.sync_devices().await.unwrap();
}

#[tokio::test]
async fn test_control_entity_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/entity/light.living_room/control"))
        .and(body_json(json!({ "service": "turn_on", "service_data": { "brightness": 200 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut data = Map::new();
    data.insert("brightness".into(), json!(200));
    let request = ControlRequest {
        service: "turn_on".into(),
        service_data: data,
    };

    client
        .control_entity("light.living_room", &request)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_control_device_by_id_sends_empty_service_data() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/7/control"))
        .and(body_json(json!({ "service": "turn_off", "service_data": {} })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let request = ControlRequest {
        service: "turn_off".into(),
        service_data: Map::new(),
    };
    client.control_device("7", &request).await.unwrap();
}

#[tokio::test]
async fn test_add_device() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/add"))
        .and(body_json(json!({ "entity_id": "light.living_room" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(light_json("off")))
        .expect(1)
        .mount(&server)
        .await;

    let device = client.add_device("light.living_room").await.unwrap();
    assert_eq!(device.entity_id, "light.living_room");
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_field_becomes_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/add"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "entity not found on hub" })),
        )
        .mount(&server)
        .await;

    let result = client.add_device("light.nope").await;

    match result {
        Err(Error::Backend { status, ref message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "entity not found on hub");
        }
        other => panic!("expected Backend error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_error_field_uses_generic_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;

    match result {
        Err(Error::Backend { status, ref message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "request failed");
        }
        other => panic!("expected Backend error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_failure_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/devices/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db locked" })))
        .mount(&server)
        .await;

    let result = client.delete_device("1").await;
    assert!(
        matches!(result, Err(Error::Backend { status: 500, .. })),
        "expected Backend error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_success_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unreachable_backend() {
    // Port 9 (discard) on localhost is reliably closed in CI containers.
    let client =
        BackendClient::from_reqwest("http://127.0.0.1:9/api", reqwest::Client::new()).unwrap();

    let err = client.hub_status().await.unwrap_err();
    assert!(err.is_unreachable(), "expected unreachable error, got: {err:?}");
}
