//! Dispatch engine integration tests
//!
//! Wires the dispatcher to real settings stores and a recording delivery
//! client; no network or Redis required.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use notification_dispatch_service::catalog::default_triggers;
use notification_dispatch_service::delivery::{DeliveryClient, DeliveryError};
use notification_dispatch_service::notification::{
    ChannelStatus, NotificationChannel, NotificationDispatcher, NotificationPolicy,
    NotificationServiceConfig, NotificationSettings, ServiceKind, TestStatus,
};
use notification_dispatch_service::policy::{PolicyDecision, PolicyGate, PolicyGateConfig};
use notification_dispatch_service::store::{
    bootstrap_settings, FileSettingsStore, MemorySettingsStore, SettingsStore,
};

#[derive(Debug, Clone, PartialEq)]
struct Delivered {
    urls: Vec<String>,
    title: String,
    body: String,
}

/// Records every call; fails when any URL starts with `fail_prefix`
#[derive(Default)]
struct RecordingClient {
    calls: Mutex<Vec<Delivered>>,
    fail_prefix: Option<&'static str>,
}

impl RecordingClient {
    fn failing_on(prefix: &'static str) -> Self {
        Self {
            fail_prefix: Some(prefix),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Delivered> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryClient for RecordingClient {
    async fn deliver(&self, urls: &[String], title: &str, body: &str) -> Result<(), DeliveryError> {
        self.calls.lock().unwrap().push(Delivered {
            urls: urls.to_vec(),
            title: title.to_string(),
            body: body.to_string(),
        });
        match self.fail_prefix {
            Some(prefix) if urls.iter().any(|u| u.starts_with(prefix)) => {
                Err(DeliveryError::Status { status: 502 })
            }
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

fn email_service() -> NotificationServiceConfig {
    NotificationServiceConfig::new(ServiceKind::Email)
        .with_setting("user", "svc")
        .with_setting("password", "p")
        .with_setting("domain", "gmail.com")
        .with_setting("to", json!(["a@x.com", "b@x.com"]))
}

fn discord_service() -> NotificationServiceConfig {
    NotificationServiceConfig::new(ServiceKind::Discord)
        .with_setting("webhookId", "123")
        .with_setting("webhookToken", "abc")
}

fn channel(
    id: &str,
    triggers: &[&str],
    services: Vec<NotificationServiceConfig>,
) -> NotificationChannel {
    let mut channel = NotificationChannel::new(id, id);
    channel.trigger_ids = triggers.iter().map(|t| t.to_string()).collect();
    channel.services = services;
    channel
}

fn settings_with(channels: Vec<NotificationChannel>) -> NotificationSettings {
    NotificationSettings {
        channels,
        ..NotificationSettings::default()
    }
}

fn dispatcher(
    settings: NotificationSettings,
    client: Arc<RecordingClient>,
) -> NotificationDispatcher {
    let store = Arc::new(MemorySettingsStore::with_settings(settings));
    NotificationDispatcher::new(store, client)
}

#[tokio::test]
async fn test_dispatch_delivers_to_subscribed_channel() {
    let client = Arc::new(RecordingClient::default());
    let settings = settings_with(vec![channel(
        "ops",
        &["task.completed"],
        vec![email_service(), discord_service()],
    )]);
    let dispatcher = dispatcher(settings, client.clone());

    let report = dispatcher
        .dispatch("task.completed", "Done", "Task finished")
        .await;

    assert_eq!(report.matched_channels, 1);
    assert_eq!(report.delivered, 1);
    assert_eq!(
        client.calls(),
        vec![Delivered {
            urls: vec![
                "mailtos://svc:p@gmail.com?to=a@x.com,b@x.com".to_string(),
                "discord://123/abc".to_string(),
            ],
            title: "Done".to_string(),
            body: "Task finished".to_string(),
        }]
    );

    let stats = dispatcher.stats();
    assert_eq!(stats.dispatches, 1);
    assert_eq!(stats.delivered, 1);
}

#[tokio::test]
async fn test_unknown_trigger_is_a_silent_no_op() {
    let client = Arc::new(RecordingClient::default());
    let settings = settings_with(vec![channel("ops", &["task.completed"], vec![email_service()])]);
    let dispatcher = dispatcher(settings, client.clone());

    let report = dispatcher.dispatch("task.failed", "x", "y").await;
    assert_eq!(report.matched_channels, 0);
    assert!(report.channels.is_empty());

    let report = dispatcher.dispatch("", "x", "y").await;
    assert_eq!(report.matched_channels, 0);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_failed_channel_does_not_affect_siblings() {
    let client = Arc::new(RecordingClient::failing_on("discord://"));
    let settings = settings_with(vec![
        channel("chat", &["system.restart"], vec![discord_service()]),
        channel("mail", &["system.restart"], vec![email_service()]),
    ]);
    let dispatcher = dispatcher(settings, client.clone());

    let report = dispatcher.dispatch("system.restart", "Restart", "").await;

    assert_eq!(report.matched_channels, 2);
    assert_eq!((report.delivered, report.failed), (1, 1));
    // Outcomes keep the channel order of the settings document
    assert_eq!(report.channels[0].channel_id, "chat");
    assert!(matches!(report.channels[0].status, ChannelStatus::Failed { .. }));
    assert_eq!(report.channels[1].status, ChannelStatus::Delivered);
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn test_inactive_channel_never_delivers() {
    let client = Arc::new(RecordingClient::default());
    let mut inactive = channel("ops", &["user.login"], vec![email_service()]);
    inactive.is_active = false;
    let dispatcher = dispatcher(settings_with(vec![inactive]), client.clone());

    let report = dispatcher.dispatch("user.login", "t", "b").await;
    assert_eq!(report.matched_channels, 0);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_policy_gate_suppresses_duplicates() {
    let client = Arc::new(RecordingClient::default());
    let mut ops = channel("ops", &["task.failed"], vec![email_service()]);
    ops.policy = NotificationPolicy {
        dedup_window_seconds: 300,
        ..NotificationPolicy::default()
    };
    let gate = Arc::new(PolicyGate::new(PolicyGateConfig::default()));
    let dispatcher = dispatcher(settings_with(vec![ops]), client.clone()).with_policy_gate(gate.clone());

    let first = dispatcher.dispatch("task.failed", "Job 7", "boom").await;
    let second = dispatcher.dispatch("task.failed", "Job 7", "boom").await;
    let different = dispatcher.dispatch("task.failed", "Job 8", "boom").await;

    assert_eq!(first.delivered, 1);
    assert_eq!(second.suppressed, 1);
    assert_eq!(
        second.channels[0].status,
        ChannelStatus::Suppressed {
            policy: PolicyDecision::Duplicate
        }
    );
    assert_eq!(different.delivered, 1);
    assert_eq!(client.calls().len(), 2);
    assert_eq!(gate.stats().suppressed, 1);
}

#[tokio::test]
async fn test_policy_gate_rate_limits_per_channel() {
    let client = Arc::new(RecordingClient::default());
    let mut limited = channel("limited", &["user.login"], vec![email_service()]);
    limited.policy.max_per_minute = 2;
    let open = channel("open", &["user.login"], vec![discord_service()]);
    let gate = Arc::new(PolicyGate::new(PolicyGateConfig::default()));
    let dispatcher =
        dispatcher(settings_with(vec![limited, open]), client.clone()).with_policy_gate(gate);

    let mut suppressed = 0;
    for i in 0..3 {
        let report = dispatcher.dispatch("user.login", &format!("login {i}"), "").await;
        suppressed += report.suppressed;
        // The unrestricted channel is never held back
        assert_eq!(report.channels[1].status, ChannelStatus::Delivered);
    }
    assert_eq!(suppressed, 1);
}

#[tokio::test]
async fn test_dispatch_reads_legacy_file_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let legacy = json!({
        "version": 0,
        "channels": [{
            "id": "legacy",
            "name": "Legacy",
            "isActive": true,
            "triggerIds": ["backup.completed"],
            "services": [{
                "id": "s1",
                "type": "discord",
                "enabled": true,
                "settings": {"webhookId": "9", "webhookToken": "z"}
            }]
        }],
        "serviceProfiles": "[{\"id\":\"p1\",\"type\":\"slack\"}]"
    });
    std::fs::write(&path, serde_json::to_vec(&legacy).unwrap()).unwrap();

    let store = Arc::new(FileSettingsStore::new(&path));
    let migrated = bootstrap_settings(store.as_ref()).await.unwrap();
    assert_eq!(migrated.version, 1);
    assert_eq!(migrated.trigger_catalog.len(), default_triggers().len());
    assert_eq!(migrated.saved_service_profiles.len(), 1);

    // Written back in current form
    let reloaded = store.load().await.unwrap().unwrap();
    assert_eq!(reloaded, migrated);

    let client = Arc::new(RecordingClient::default());
    let dispatcher = NotificationDispatcher::new(store, client.clone());
    let report = dispatcher.dispatch("backup.completed", "Backup", "ok").await;
    assert_eq!(report.delivered, 1);
    assert_eq!(client.calls()[0].urls, vec!["discord://9/z"]);
}

#[tokio::test]
async fn test_service_test_reports_status() {
    let client = Arc::new(RecordingClient::failing_on("discord://"));
    let dispatcher = dispatcher(NotificationSettings::default(), client.clone());

    let ok = dispatcher.test_service(&email_service(), "T", "B").await;
    assert_eq!(ok.status, TestStatus::Success);
    assert_eq!(ok.message.as_deref(), Some("Notification sent successfully"));
    assert!(ok.tested_at.is_some());

    let failed = dispatcher.test_service(&discord_service(), "T", "B").await;
    assert_eq!(failed.status, TestStatus::Failed);
    assert_eq!(failed.message.as_deref(), Some("Failed to send notification"));

    let incomplete = NotificationServiceConfig::new(ServiceKind::Telegram);
    let invalid = dispatcher.test_service(&incomplete, "T", "B").await;
    assert_eq!(invalid.status, TestStatus::Failed);
    assert_eq!(
        invalid.message.as_deref(),
        Some("Service configuration is missing or invalid")
    );

    // Invalid configuration never reaches the gateway
    assert_eq!(client.calls().len(), 2);
    assert_eq!(dispatcher.stats().services_tested, 3);
}
