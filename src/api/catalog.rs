//! Read-only catalog endpoints.

use axum::Json;
use serde::Serialize;

use crate::catalog::{default_service_schemas, default_triggers};
use crate::notification::{ServiceTypeSchema, Trigger};

#[derive(Debug, Serialize)]
pub struct TriggerCatalogResponse {
    pub total: usize,
    pub triggers: Vec<Trigger>,
}

#[derive(Debug, Serialize)]
pub struct ServiceCatalogResponse {
    pub total: usize,
    pub services: Vec<ServiceTypeSchema>,
}

/// GET /api/v1/catalog/triggers
pub async fn trigger_catalog() -> Json<TriggerCatalogResponse> {
    let triggers = default_triggers();
    Json(TriggerCatalogResponse {
        total: triggers.len(),
        triggers,
    })
}

/// GET /api/v1/catalog/services
pub async fn service_catalog() -> Json<ServiceCatalogResponse> {
    let services = default_service_schemas();
    Json(ServiceCatalogResponse {
        total: services.len(),
        services,
    })
}
