use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use crate::delivery::DeliveryClient;
use crate::encoder::encode;
use crate::metrics::DispatchMetrics;
use crate::policy::{fingerprint, PolicyDecision, PolicyGate};
use crate::store::{load_settings, SettingsStore};

use super::types::{
    NotificationChannel, NotificationServiceConfig, NotificationServiceTestResult,
    NotificationSettings, TestStatus,
};

/// Default cap on concurrent channel deliveries per dispatch
const DEFAULT_MAX_CONCURRENT: usize = 16;

/// One matched channel and the URLs of its encodable services
#[derive(Debug, Clone)]
pub struct ChannelDelivery<'a> {
    /// Index of the channel in the settings document
    pub position: usize,
    pub channel: &'a NotificationChannel,
    pub urls: Vec<String>,
}

impl ChannelDelivery<'_> {
    /// Policy gate key: the channel id, or the document position when the
    /// id is blank so anonymous channels never share state.
    pub fn policy_key(&self) -> Cow<'_, str> {
        if self.channel.id.trim().is_empty() {
            Cow::Owned(format!("#position:{}", self.position))
        } else {
            Cow::Borrowed(self.channel.id.as_str())
        }
    }
}

/// Select the channels a trigger fans out to.
///
/// A channel is emitted when it is active, lists `trigger_id` exactly and at
/// least one enabled service encodes. Channel policy is not consulted.
pub fn select_deliveries<'a>(
    trigger_id: &str,
    settings: &'a NotificationSettings,
) -> Vec<ChannelDelivery<'a>> {
    if trigger_id.is_empty() {
        return Vec::new();
    }

    settings
        .channels
        .iter()
        .enumerate()
        .filter(|(_, channel)| channel.is_active && channel.subscribes_to(trigger_id))
        .filter_map(|(position, channel)| {
            let urls: Vec<String> = channel
                .services
                .iter()
                .filter(|service| service.enabled)
                .filter_map(|service| {
                    let url = encode(service);
                    if url.is_none() {
                        DispatchMetrics::record_service_skipped(&service.service_type);
                    }
                    url
                })
                .collect();

            (!urls.is_empty()).then_some(ChannelDelivery {
                position,
                channel,
                urls,
            })
        })
        .collect()
}

/// What happened to one matched channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelStatus {
    Delivered,
    Failed { error: String },
    Suppressed { policy: PolicyDecision },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelOutcome {
    pub channel_id: String,
    pub channel_name: String,
    pub urls: usize,
    #[serde(flatten)]
    pub status: ChannelStatus,
}

/// Result of dispatching one trigger
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub dispatch_id: Uuid,
    pub trigger_id: String,
    pub matched_channels: usize,
    pub delivered: usize,
    pub failed: usize,
    pub suppressed: usize,
    pub channels: Vec<ChannelOutcome>,
}

impl DispatchReport {
    fn new(trigger_id: &str, channels: Vec<ChannelOutcome>) -> Self {
        let count = |f: fn(&ChannelStatus) -> bool| channels.iter().filter(|c| f(&c.status)).count();
        Self {
            dispatch_id: Uuid::new_v4(),
            trigger_id: trigger_id.to_string(),
            matched_channels: channels.len(),
            delivered: count(|s| matches!(s, ChannelStatus::Delivered)),
            failed: count(|s| matches!(s, ChannelStatus::Failed { .. })),
            suppressed: count(|s| matches!(s, ChannelStatus::Suppressed { .. })),
            channels,
        }
    }
}

/// Statistics for the notification dispatcher
#[derive(Debug, Default)]
pub struct DispatcherStats {
    pub dispatches: AtomicU64,
    pub channels_matched: AtomicU64,
    pub delivered: AtomicU64,
    pub failed: AtomicU64,
    pub suppressed: AtomicU64,
    pub services_tested: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            dispatches: self.dispatches.load(Ordering::Relaxed),
            channels_matched: self.channels_matched.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            services_tested: self.services_tested.load(Ordering::Relaxed),
        }
    }

    fn record(&self, report: &DispatchReport) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
        self.channels_matched
            .fetch_add(report.matched_channels as u64, Ordering::Relaxed);
        self.delivered.fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.failed.fetch_add(report.failed as u64, Ordering::Relaxed);
        self.suppressed.fetch_add(report.suppressed as u64, Ordering::Relaxed);
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub dispatches: u64,
    pub channels_matched: u64,
    pub delivered: u64,
    pub failed: u64,
    pub suppressed: u64,
    pub services_tested: u64,
}

struct PendingDelivery<'a> {
    index: usize,
    channel: &'a NotificationChannel,
    urls: Vec<String>,
}

/// Turns triggers into channel deliveries
pub struct NotificationDispatcher {
    store: Arc<dyn SettingsStore>,
    delivery: Arc<dyn DeliveryClient>,
    policy_gate: Option<Arc<PolicyGate>>,
    max_concurrent: usize,
    stats: DispatcherStats,
}

impl NotificationDispatcher {
    /// Create a dispatcher without policy enforcement
    pub fn new(store: Arc<dyn SettingsStore>, delivery: Arc<dyn DeliveryClient>) -> Self {
        Self {
            store,
            delivery,
            policy_gate: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            stats: DispatcherStats::default(),
        }
    }

    /// Enforce channel policies through the given gate
    pub fn with_policy_gate(mut self, gate: Arc<PolicyGate>) -> Self {
        self.policy_gate = Some(gate);
        self
    }

    /// Cap concurrent channel deliveries per dispatch
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    pub fn policy_gate(&self) -> Option<&Arc<PolicyGate>> {
        self.policy_gate.as_ref()
    }

    pub fn delivery_name(&self) -> &'static str {
        self.delivery.name()
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Dispatch a trigger against the current stored settings
    #[tracing::instrument(name = "dispatcher.dispatch", skip(self, title, body))]
    pub async fn dispatch(&self, trigger_id: &str, title: &str, body: &str) -> DispatchReport {
        if trigger_id.is_empty() {
            DispatchMetrics::record_empty_trigger();
            return DispatchReport::new(trigger_id, Vec::new());
        }

        let settings = load_settings(self.store.as_ref()).await;
        self.dispatch_with_settings(&settings, trigger_id, title, body)
            .await
    }

    /// Dispatch a trigger against a caller-provided settings snapshot
    #[tracing::instrument(
        name = "dispatcher.dispatch_with_settings",
        skip(self, settings, title, body),
        fields(channels = settings.channels.len())
    )]
    pub async fn dispatch_with_settings(
        &self,
        settings: &NotificationSettings,
        trigger_id: &str,
        title: &str,
        body: &str,
    ) -> DispatchReport {
        let selected = select_deliveries(trigger_id, settings);
        DispatchMetrics::record_dispatch(selected.len());

        if selected.is_empty() {
            tracing::debug!(trigger_id = %trigger_id, "No channels subscribed");
            let report = DispatchReport::new(trigger_id, Vec::new());
            self.stats.record(&report);
            return report;
        }

        let fp = fingerprint(trigger_id, title, body);
        let mut outcomes: Vec<(usize, ChannelOutcome)> = Vec::with_capacity(selected.len());
        let mut pending = Vec::with_capacity(selected.len());

        for (index, delivery) in selected.into_iter().enumerate() {
            let decision = match &self.policy_gate {
                Some(gate) => gate.check(&delivery.policy_key(), &delivery.channel.policy, fp),
                None => PolicyDecision::Allow,
            };
            let ChannelDelivery { channel, urls, .. } = delivery;

            if decision.is_allowed() {
                pending.push(PendingDelivery { index, channel, urls });
            } else {
                DispatchMetrics::record_suppressed(&decision);
                tracing::debug!(
                    channel_id = %channel.id,
                    reason = decision.reason(),
                    "Delivery suppressed by channel policy"
                );
                outcomes.push((
                    index,
                    ChannelOutcome {
                        channel_id: channel.id.clone(),
                        channel_name: channel.name.clone(),
                        urls: urls.len(),
                        status: ChannelStatus::Suppressed { policy: decision },
                    },
                ));
            }
        }

        let mut queue = pending.into_iter();
        let mut in_flight = FuturesUnordered::new();
        loop {
            while in_flight.len() < self.max_concurrent {
                match queue.next() {
                    Some(delivery) => in_flight.push(self.deliver_channel(delivery, title, body)),
                    None => break,
                }
            }
            match in_flight.next().await {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            }
        }

        outcomes.sort_by_key(|(index, _)| *index);
        let report = DispatchReport::new(
            trigger_id,
            outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
        );
        self.stats.record(&report);

        tracing::info!(
            trigger_id = %trigger_id,
            dispatch_id = %report.dispatch_id,
            matched = report.matched_channels,
            delivered = report.delivered,
            failed = report.failed,
            suppressed = report.suppressed,
            "Trigger dispatched"
        );
        report
    }

    async fn deliver_channel(
        &self,
        pending: PendingDelivery<'_>,
        title: &str,
        body: &str,
    ) -> (usize, ChannelOutcome) {
        let PendingDelivery { index, channel, urls } = pending;
        let started = Instant::now();
        let result = self.delivery.deliver(&urls, title, body).await;
        DispatchMetrics::record_delivery(result.is_ok(), started.elapsed().as_secs_f64());

        let status = match result {
            Ok(()) => ChannelStatus::Delivered,
            Err(e) => {
                tracing::warn!(
                    channel_id = %channel.id,
                    client = self.delivery.name(),
                    error = %e,
                    "Channel delivery failed"
                );
                ChannelStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        (
            index,
            ChannelOutcome {
                channel_id: channel.id.clone(),
                channel_name: channel.name.clone(),
                urls: urls.len(),
                status,
            },
        )
    }

    /// Encode one service and send a single test notification through it
    #[tracing::instrument(
        name = "dispatcher.test_service",
        skip(self, service, title, body),
        fields(service_id = %service.id, service_type = %service.service_type)
    )]
    pub async fn test_service(
        &self,
        service: &NotificationServiceConfig,
        title: &str,
        body: &str,
    ) -> NotificationServiceTestResult {
        self.stats.services_tested.fetch_add(1, Ordering::Relaxed);
        let tested_at = Some(chrono::Utc::now().to_rfc3339());

        let Some(url) = encode(service) else {
            DispatchMetrics::record_service_test(TestStatus::Failed.as_str());
            return NotificationServiceTestResult {
                status: TestStatus::Failed,
                message: Some("Service configuration is missing or invalid".to_string()),
                tested_at,
            };
        };

        let (status, message) = match self.delivery.deliver(&[url], title, body).await {
            Ok(()) => (TestStatus::Success, "Notification sent successfully"),
            Err(e) => {
                tracing::warn!(error = %e, "Service test delivery failed");
                (TestStatus::Failed, "Failed to send notification")
            }
        };
        DispatchMetrics::record_service_test(status.as_str());

        NotificationServiceTestResult {
            status,
            message: Some(message.to_string()),
            tested_at,
        }
    }
}
