//! HTTP trigger handler

use axum::{extract::State, Json};

use crate::error::{AppError, Result};
use crate::metrics::TriggerMetrics;
use crate::notification::DispatchReport;
use crate::server::AppState;

use super::TriggerMessage;

/// Dispatch a trigger and return the per-channel report
#[tracing::instrument(
    name = "http.trigger_dispatch",
    skip(state, request),
    fields(trigger_id = %request.trigger_id)
)]
pub async fn trigger_dispatch(
    State(state): State<AppState>,
    Json(request): Json<TriggerMessage>,
) -> Result<Json<DispatchReport>> {
    TriggerMetrics::record_http();

    let trigger_id = request.trigger_id.trim();
    if trigger_id.is_empty() {
        return Err(AppError::Validation("triggerId must not be empty".to_string()));
    }

    let report = state
        .dispatcher
        .dispatch(trigger_id, &request.title, &request.body)
        .await;

    Ok(Json(report))
}
