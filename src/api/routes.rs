use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};
use crate::triggers::trigger_dispatch;

use super::catalog::{service_catalog, trigger_catalog};
use super::health::{health, stats};
use super::metrics::prometheus_metrics;
use super::services::test_service;
use super::settings::{get_settings, put_settings};

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health, stats & metrics
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1",
            Router::new()
                // Trigger intake
                .route("/triggers", post(trigger_dispatch))
                // Catalogs
                .route("/catalog/triggers", get(trigger_catalog))
                .route("/catalog/services", get(service_catalog))
                // Settings document
                .route("/settings", get(get_settings).put(put_settings))
                // Service test
                .route("/services/test", post(test_service))
                .route_layer(middleware::from_fn_with_state(state, api_key_auth)),
        )
}
