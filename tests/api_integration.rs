//! HTTP surface integration tests
//!
//! Drives the axum router in-process with `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use notification_dispatch_service::catalog::{default_service_schemas, default_triggers};
use notification_dispatch_service::config::Settings;
use notification_dispatch_service::delivery::{DeliveryClient, DeliveryError};
use notification_dispatch_service::notification::{
    NotificationChannel, NotificationDispatcher, NotificationServiceConfig, NotificationSettings,
    ServiceKind,
};
use notification_dispatch_service::policy::{PolicyGate, PolicyGateConfig};
use notification_dispatch_service::server::{create_app, AppState};
use notification_dispatch_service::store::{MemorySettingsStore, SettingsStore};

#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl DeliveryClient for RecordingClient {
    async fn deliver(&self, urls: &[String], _title: &str, _body: &str) -> Result<(), DeliveryError> {
        self.calls.lock().unwrap().push(urls.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemorySettingsStore>,
    client: Arc<RecordingClient>,
}

fn ops_settings() -> NotificationSettings {
    let mut ops = NotificationChannel::new("ops", "Operations");
    ops.trigger_ids = vec!["task.failed".to_string()];
    ops.services.push(
        NotificationServiceConfig::new(ServiceKind::Discord)
            .with_setting("webhookId", "123")
            .with_setting("webhookToken", "abc"),
    );
    NotificationSettings {
        channels: vec![ops],
        ..NotificationSettings::default()
    }
}

fn test_app(api_key: Option<&str>) -> TestApp {
    let mut settings = Settings::default();
    settings.api.key = api_key.map(str::to_string);

    let store = Arc::new(MemorySettingsStore::with_settings(ops_settings()));
    let client = Arc::new(RecordingClient::default());
    let gate = Arc::new(PolicyGate::new(PolicyGateConfig::default()));
    let dispatcher = Arc::new(
        NotificationDispatcher::new(store.clone(), client.clone()).with_policy_gate(gate),
    );

    TestApp {
        router: create_app(AppState::new(settings, dispatcher)),
        store,
        client,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_and_stats() {
    let app = test_app(None);

    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["backend"], "memory");
    assert_eq!(body["delivery"]["backend"], "recording");
    assert!(body.get("redis").is_none());

    let (status, body) = send(&app.router, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dispatcher"]["dispatches"], 0);
    assert_eq!(body["policy"]["tracked_channels"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = test_app(None);
    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_trigger_dispatches_to_channel() {
    let app = test_app(None);

    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/v1/triggers",
            json!({"triggerId": "task.failed", "title": "Job failed", "body": "exit 1"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trigger_id"], "task.failed");
    assert_eq!(body["matched_channels"], 1);
    assert_eq!(body["delivered"], 1);
    assert_eq!(body["channels"][0]["channel_id"], "ops");
    assert_eq!(body["channels"][0]["status"], "delivered");
    assert_eq!(
        app.client.calls.lock().unwrap().clone(),
        vec![vec!["discord://123/abc".to_string()]]
    );
}

#[tokio::test]
async fn test_trigger_rejects_empty_id() {
    let app = test_app(None);

    let (status, body) = send(
        &app.router,
        json_request("POST", "/api/v1/triggers", json!({"triggerId": "  "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(app.client.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_api_key_guards_api_routes() {
    let app = test_app(Some("secret"));

    let (status, body) = send(&app.router, get("/api/v1/catalog/triggers")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let wrong = Request::builder()
        .uri("/api/v1/catalog/triggers")
        .header("X-API-Key", "nope")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app.router, wrong).await.0, StatusCode::UNAUTHORIZED);

    let right = Request::builder()
        .uri("/api/v1/catalog/triggers")
        .header("X-API-Key", "secret")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app.router, right).await.0, StatusCode::OK);

    // Health stays open
    assert_eq!(send(&app.router, get("/health")).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = test_app(None);

    let (status, body) = send(&app.router, get("/api/v1/catalog/triggers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], default_triggers().len());

    let (status, body) = send(&app.router, get("/api/v1/catalog/services")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 19);
    assert_eq!(
        body["services"].as_array().unwrap().len(),
        default_service_schemas().len()
    );
}

#[tokio::test]
async fn test_settings_round_trip() {
    let app = test_app(None);

    let (status, body) = send(&app.router, get("/api/v1/settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["channels"][0]["id"], "ops");
    assert_eq!(
        body["triggerCatalog"].as_array().unwrap().len(),
        default_triggers().len()
    );

    let update = json!({
        "version": 0,
        "channels": [{"id": "mail", "name": "Mail", "triggerIds": ["user.login"]}],
        "serviceProfiles": [{"id": "p1", "type": "slack"}]
    });
    let request = Request::builder()
        .method("PUT")
        .uri("/api/v1/settings")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Updated-By", "alice")
        .body(Body::from(update.to_string()))
        .unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 1);
    assert_eq!(body["updatedBy"], "alice");
    assert!(body["updatedAt"].is_string());

    let stored = app.store.load().await.unwrap().unwrap();
    assert_eq!(stored.channels[0].id, "mail");
    assert_eq!(stored.saved_service_profiles.len(), 1);
    assert_eq!(stored.updated_by.as_deref(), Some("alice"));
    assert_eq!(stored.service_type_schemas.len(), 19);
}

#[tokio::test]
async fn test_service_test_endpoint() {
    let app = test_app(None);

    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/v1/services/test",
            json!({
                "service": {
                    "type": "discord",
                    "settings": {"webhookId": "1", "webhookToken": "t"}
                }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["testedAt"].is_string());

    let (_, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/v1/services/test",
            json!({"service": {"type": "telegram"}, "title": "Ping"}),
        ),
    )
    .await;
    assert_eq!(body["status"], "failed");
    assert_eq!(body["message"], "Service configuration is missing or invalid");
}
