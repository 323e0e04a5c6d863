//! Prometheus metrics for the dispatch service.
//!
//! - Dispatch metrics (calls, matched channels, deliveries, latency)
//! - Policy gate suppressions
//! - Encoder skips by service type
//! - Settings store and trigger intake
//! - Redis health

mod helpers;

pub use helpers::{encode_metrics, DispatchMetrics, RedisMetrics, StoreMetrics, TriggerMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "dispatch";

lazy_static! {
    // ============================================================================
    // Dispatch Metrics
    // ============================================================================

    /// Dispatch calls by outcome (matched, no_match, empty_trigger)
    pub static ref DISPATCH_CALLS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_calls_total", METRIC_PREFIX),
        "Total dispatch calls by outcome",
        &["outcome"]
    ).unwrap();

    /// Channels selected for delivery
    pub static ref CHANNELS_MATCHED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_channels_matched_total", METRIC_PREFIX),
        "Total channels matched by dispatched triggers"
    ).unwrap();

    /// Delivery calls by result (success, failure)
    pub static ref DELIVERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_deliveries_total", METRIC_PREFIX),
        "Total delivery calls by result",
        &["result"]
    ).unwrap();

    /// Deliveries suppressed by the policy gate
    pub static ref SUPPRESSED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_suppressed_total", METRIC_PREFIX),
        "Total deliveries suppressed by channel policy",
        &["reason"]
    ).unwrap();

    /// Enabled services that produced no URL
    pub static ref SERVICES_SKIPPED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_services_skipped_total", METRIC_PREFIX),
        "Total enabled services skipped because they could not be encoded",
        &["service_type"]
    ).unwrap();

    /// Manual service tests by status
    pub static ref SERVICE_TESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_service_tests_total", METRIC_PREFIX),
        "Total manual service tests by status",
        &["status"]
    ).unwrap();

    /// Delivery call latency
    pub static ref DELIVERY_LATENCY: Histogram = register_histogram!(
        format!("{}_delivery_latency_seconds", METRIC_PREFIX),
        "Delivery call latency in seconds",
        vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    // ============================================================================
    // Store & Trigger Metrics
    // ============================================================================

    /// Settings loads that fell back to defaults
    pub static ref SETTINGS_LOAD_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_settings_load_failures_total", METRIC_PREFIX),
        "Total settings loads that failed and fell back to defaults"
    ).unwrap();

    /// Settings documents saved
    pub static ref SETTINGS_SAVES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_settings_saves_total", METRIC_PREFIX),
        "Total settings documents saved"
    ).unwrap();

    /// Trigger messages received by source (http, redis)
    pub static ref TRIGGER_MESSAGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_trigger_messages_total", METRIC_PREFIX),
        "Total trigger messages received by source",
        &["source"]
    ).unwrap();

    /// Trigger messages that could not be parsed
    pub static ref TRIGGER_PARSE_ERRORS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_trigger_parse_errors_total", METRIC_PREFIX),
        "Total trigger messages dropped because they could not be parsed"
    ).unwrap();

    // ============================================================================
    // Redis Metrics
    // ============================================================================

    /// Redis connection status (1 = connected, 0 = disconnected)
    pub static ref REDIS_CONNECTION_STATUS: IntGauge = register_int_gauge!(
        format!("{}_redis_connection_status", METRIC_PREFIX),
        "Redis connection status (1=connected, 0=disconnected)"
    ).unwrap();

    /// Redis circuit breaker state (0=closed, 1=open, 2=half-open)
    pub static ref REDIS_CIRCUIT_BREAKER_STATE: IntGauge = register_int_gauge!(
        format!("{}_redis_circuit_breaker_state", METRIC_PREFIX),
        "Redis circuit breaker state (0=closed, 1=open, 2=half-open)"
    ).unwrap();

    /// Total Redis reconnection attempts
    pub static ref REDIS_RECONNECTIONS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_redis_reconnections_total", METRIC_PREFIX),
        "Total Redis reconnection attempts"
    ).unwrap();
}
