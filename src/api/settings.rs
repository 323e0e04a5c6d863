//! Settings document endpoints.

use axum::{extract::State, http::HeaderMap, Json};

use crate::catalog::apply_defaults;
use crate::error::Result;
use crate::metrics::StoreMetrics;
use crate::notification::NotificationSettings;
use crate::server::AppState;

/// Header naming who saved the document
pub const UPDATED_BY_HEADER: &str = "X-Updated-By";

/// GET /api/v1/settings - stored document, migrated
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<NotificationSettings>> {
    let stored = state.store().load().await?;
    Ok(Json(apply_defaults(stored)))
}

/// PUT /api/v1/settings - replace the stored document
#[tracing::instrument(name = "http.put_settings", skip(state, headers, settings))]
pub async fn put_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(settings): Json<NotificationSettings>,
) -> Result<Json<NotificationSettings>> {
    let mut settings = apply_defaults(Some(settings));
    settings.updated_at = Some(chrono::Utc::now().to_rfc3339());
    settings.updated_by = headers
        .get(UPDATED_BY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    state.store().save(&settings).await?;
    StoreMetrics::record_save();

    tracing::info!(
        channels = settings.channels.len(),
        updated_by = ?settings.updated_by,
        "Notification settings saved"
    );
    Ok(Json(settings))
}
