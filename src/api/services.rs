//! Single-service test endpoint.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::notification::{NotificationServiceConfig, NotificationServiceTestResult};
use crate::server::AppState;

const DEFAULT_TEST_TITLE: &str = "Test notification";
const DEFAULT_TEST_BODY: &str = "This is a test notification from the notification service.";

#[derive(Debug, Deserialize)]
pub struct TestServiceRequest {
    pub service: NotificationServiceConfig,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// POST /api/v1/services/test
pub async fn test_service(
    State(state): State<AppState>,
    Json(request): Json<TestServiceRequest>,
) -> Json<NotificationServiceTestResult> {
    let title = request.title.as_deref().unwrap_or(DEFAULT_TEST_TITLE);
    let body = request.body.as_deref().unwrap_or(DEFAULT_TEST_BODY);

    let result = state
        .dispatcher
        .test_service(&request.service, title, body)
        .await;
    Json(result)
}
