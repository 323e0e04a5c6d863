//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::notification::DispatcherStatsSnapshot;
use crate::policy::PolicyGateStats;
use crate::redis::CircuitState;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: StoreHealthResponse,
    pub delivery: DeliveryHealthResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisHealthResponse>,
}

#[derive(Debug, Serialize)]
pub struct StoreHealthResponse {
    pub backend: String,
}

#[derive(Debug, Serialize)]
pub struct DeliveryHealthResponse {
    pub backend: String,
}

#[derive(Debug, Serialize)]
pub struct RedisHealthResponse {
    pub circuit_breaker_state: CircuitState,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub dispatcher: DispatcherStatsSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyGateStats>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let redis = state.redis_pool.as_ref().map(|pool| {
        let circuit_breaker_state = pool.circuit_state();
        RedisHealthResponse {
            circuit_breaker_state,
            available: circuit_breaker_state != CircuitState::Open,
        }
    });

    let degraded = redis.as_ref().is_some_and(|r| !r.available);
    let status = if degraded { "degraded" } else { "healthy" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        store: StoreHealthResponse {
            backend: state.store().backend_name().to_string(),
        },
        delivery: DeliveryHealthResponse {
            backend: state.dispatcher.delivery_name().to_string(),
        },
        redis,
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        dispatcher: state.dispatcher.stats(),
        policy: state.policy_gate().map(|gate| gate.stats()),
    })
}
