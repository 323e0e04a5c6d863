//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use crate::notification::ServiceType;
use crate::policy::PolicyDecision;

use super::{
    CHANNELS_MATCHED_TOTAL, DELIVERIES_TOTAL, DELIVERY_LATENCY, DISPATCH_CALLS_TOTAL,
    REDIS_CIRCUIT_BREAKER_STATE, REDIS_CONNECTION_STATUS, REDIS_RECONNECTIONS_TOTAL,
    SERVICES_SKIPPED_TOTAL, SERVICE_TESTS_TOTAL, SETTINGS_LOAD_FAILURES_TOTAL,
    SETTINGS_SAVES_TOTAL, SUPPRESSED_TOTAL, TRIGGER_MESSAGES_TOTAL, TRIGGER_PARSE_ERRORS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording dispatch metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    pub fn record_empty_trigger() {
        DISPATCH_CALLS_TOTAL.with_label_values(&["empty_trigger"]).inc();
    }

    /// Record a dispatch and how many channels it matched
    pub fn record_dispatch(matched_channels: usize) {
        let outcome = if matched_channels == 0 { "no_match" } else { "matched" };
        DISPATCH_CALLS_TOTAL.with_label_values(&[outcome]).inc();
        CHANNELS_MATCHED_TOTAL.inc_by(matched_channels as u64);
    }

    pub fn record_delivery(success: bool, elapsed_secs: f64) {
        let result = if success { "success" } else { "failure" };
        DELIVERIES_TOTAL.with_label_values(&[result]).inc();
        DELIVERY_LATENCY.observe(elapsed_secs);
    }

    pub fn record_suppressed(decision: &PolicyDecision) {
        SUPPRESSED_TOTAL.with_label_values(&[decision.reason()]).inc();
    }

    /// Record an enabled service that produced no URL
    pub fn record_service_skipped(service_type: &ServiceType) {
        let label = match service_type {
            ServiceType::Known(kind) => kind.as_str(),
            ServiceType::Custom(_) => "custom",
        };
        SERVICES_SKIPPED_TOTAL.with_label_values(&[label]).inc();
    }

    pub fn record_service_test(status: &str) {
        SERVICE_TESTS_TOTAL.with_label_values(&[status]).inc();
    }
}

/// Helper struct for recording settings store metrics
pub struct StoreMetrics;

impl StoreMetrics {
    pub fn record_load_failure() {
        SETTINGS_LOAD_FAILURES_TOTAL.inc();
    }

    pub fn record_save() {
        SETTINGS_SAVES_TOTAL.inc();
    }
}

/// Helper struct for recording trigger intake metrics
pub struct TriggerMetrics;

impl TriggerMetrics {
    pub fn record_http() {
        TRIGGER_MESSAGES_TOTAL.with_label_values(&["http"]).inc();
    }

    pub fn record_redis() {
        TRIGGER_MESSAGES_TOTAL.with_label_values(&["redis"]).inc();
    }

    pub fn record_parse_error() {
        TRIGGER_PARSE_ERRORS_TOTAL.inc();
    }
}

/// Helper struct for recording Redis health metrics
pub struct RedisMetrics;

impl RedisMetrics {
    pub fn set_connected(connected: bool) {
        REDIS_CONNECTION_STATUS.set(if connected { 1 } else { 0 });
    }

    /// 0 = closed, 1 = open, 2 = half-open
    pub fn set_circuit_state(state: i64) {
        REDIS_CIRCUIT_BREAKER_STATE.set(state);
    }

    pub fn record_reconnection() {
        REDIS_RECONNECTIONS_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::ServiceKind;

    #[test]
    fn test_encode_contains_recorded_metrics() {
        DispatchMetrics::record_dispatch(2);
        DispatchMetrics::record_service_skipped(&ServiceType::Known(ServiceKind::Slack));
        TriggerMetrics::record_http();

        let text = encode_metrics().unwrap();
        assert!(text.contains("dispatch_calls_total"));
        assert!(text.contains("dispatch_services_skipped_total"));
        assert!(text.contains("dispatch_trigger_messages_total"));
    }
}
