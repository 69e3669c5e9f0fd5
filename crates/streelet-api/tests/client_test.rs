#![allow(clippy::unwrap_used)]
// Integration tests for `DashboardClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streelet_api::{ConfigureRequest, DashboardClient, Error, NewDevice, PowerAction, RawId};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DashboardClient) {
    let server = MockServer::start().await;
    let client =
        DashboardClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    (server, client)
}

// ── Device listing ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Fan 02", "status": "online", "last_seen": 1_717_000_000 },
            { "id": "esp-7", "status": "offline", "last_seen": null, "topic": "streelet/yard" }
        ])))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, RawId::from(1));
    assert_eq!(devices[0].name.as_deref(), Some("Fan 02"));
    assert_eq!(devices[0].status, "online");
    assert_eq!(devices[1].id, RawId::from("esp-7"));
    assert_eq!(devices[1].name, None);
    assert_eq!(devices[1].topic.as_deref(), Some("streelet/yard"));
}

#[tokio::test]
async fn test_list_devices_decode_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_wifi_setup_redirect_is_detected() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/wifi", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wifi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>wifi</form>"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::WifiSetupRequired)),
        "expected WifiSetupRequired, got: {result:?}"
    );
}

// ── Power ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_power_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/1/power/off"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Device \"1\" command \"off\" sent successfully."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let message = client.set_power("1", PowerAction::Off).await.unwrap();
    assert_eq!(message, "Device \"1\" command \"off\" sent successfully.");
}

#[tokio::test]
async fn test_set_power_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/9/power/on"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Device with id \"9\" not found."
        })))
        .mount(&server)
        .await;

    let err = client.set_power("9", PowerAction::On).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.server_message(), Some("Device with id \"9\" not found."));
}

#[tokio::test]
async fn test_set_power_error_body_with_200() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/1/power/on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "broker down" })))
        .mount(&server)
        .await;

    let result = client.set_power("1", PowerAction::On).await;
    assert!(
        matches!(result, Err(Error::Rejected { ref message }) if message == "broker down"),
        "got: {result:?}"
    );
}

// ── Delete / add ────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_device() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices/esp-7/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Dispositivo con ID \"esp-7\" eliminado correctamente"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let message = client.delete_device("esp-7").await.unwrap();
    assert!(message.contains("esp-7"));
}

#[tokio::test]
async fn test_add_device_conflict() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/devices"))
        .and(body_json(json!({ "device_id": "esp-1", "topic": "streelet/yard" })))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "El dispositivo con device_id \"esp-1\" ya existe"
        })))
        .mount(&server)
        .await;

    let err = client
        .add_device(&NewDevice {
            device_id: "esp-1".into(),
            name: None,
            topic: "streelet/yard".into(),
            ip: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
}

// ── Provisioning ────────────────────────────────────────────────────

#[tokio::test]
async fn test_configure_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/configure"))
        .and(body_json(json!({ "grupo": "g1", "name": "n1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let message = client
        .configure(&ConfigureRequest {
            group: "g1".into(),
            name: "n1".into(),
        })
        .await
        .unwrap();

    assert_eq!(message.as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_configure_incomplete_data() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/configure"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Datos incompletos para configurar el ESP"
        })))
        .mount(&server)
        .await;

    let err = client
        .configure(&ConfigureRequest {
            group: "g1".into(),
            name: String::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.server_message(),
        Some("Datos incompletos para configurar el ESP")
    );
}

#[tokio::test]
async fn test_set_wifi_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/wifi"))
        .and(body_string_contains("ssid=HomeNet"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>dashboard</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let password = SecretString::from("hunter22".to_string());
    client.set_wifi_credentials("HomeNet", &password).await.unwrap();
}

#[tokio::test]
async fn test_set_wifi_credentials_missing_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/wifi"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string("Error: Debes ingresar tanto el SSID como la contraseña"),
        )
        .mount(&server)
        .await;

    let password = SecretString::from(String::new());
    let err = client.set_wifi_credentials("HomeNet", &password).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.server_message().is_some_and(|m| m.contains("SSID")));
}

/// Base URL of a local port with nothing listening on it.
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_connection_refused_is_transient() {
    let uri = closed_port_uri();

    let client = DashboardClient::with_client(reqwest::Client::new(), Url::parse(&uri).unwrap());

    let err = client.list_devices().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_transient());
}
