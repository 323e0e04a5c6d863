//! API layer - HTTP endpoint handlers organized by domain.

mod catalog;
mod health;
mod metrics;
mod routes;
mod services;
mod settings;

// Re-export all handlers for use in server/app.rs
pub use catalog::{service_catalog, trigger_catalog, ServiceCatalogResponse, TriggerCatalogResponse};
pub use health::{health, stats, HealthResponse, StatsResponse};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
pub use services::{test_service, TestServiceRequest};
pub use settings::{get_settings, put_settings, UPDATED_BY_HEADER};
