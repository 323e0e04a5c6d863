//! Notification settings data model.
//!
//! Every record mirrors the persisted JSON document (camelCase keys). Reading
//! is lenient: unknown keys are ignored, `null` means "field default" and
//! unknown enum strings fall back to the field default, so a stale or
//! hand-edited document always loads.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::profiles::normalize_service_profiles;

/// Raw per-service field values, keyed by the field schema's `key`.
pub type ServiceSettings = BTreeMap<String, Value>;

/// Implements the lowercase wire name, `Display` and a case-insensitive
/// `FromStr` for a fieldless enum.
macro_rules! wire_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($name) {
                        return Ok($ty::$variant);
                    }
                )+
                Err(UnknownVariant(s.to_string()))
            }
        }
    };
}

/// Error returned when a wire name matches no enum variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// Functional area a trigger belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerDomain {
    User,
    Agent,
    Task,
    Policy,
    #[default]
    System,
}

wire_names!(TriggerDomain {
    User => "user",
    Agent => "agent",
    Task => "task",
    Policy => "policy",
    System => "system",
});

/// Severity attached to a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

wire_names!(Severity {
    Info => "info",
    Warning => "warning",
    Error => "error",
    Critical => "critical",
});

/// Channel grouping shown to administrators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelCategory {
    Directory,
    #[default]
    Notification,
    Xmpp,
    File,
    Email,
    Other,
}

wire_names!(ChannelCategory {
    Directory => "directory",
    Notification => "notification",
    Xmpp => "xmpp",
    File => "file",
    Email => "email",
    Other => "other",
});

/// How a configuration field is rendered in forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Password,
}

wire_names!(InputType {
    Text => "text",
    Password => "password",
});

/// Outcome of the last manual service test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Idle,
    Success,
    Failed,
}

wire_names!(TestStatus {
    Idle => "idle",
    Success => "success",
    Failed => "failed",
});

/// The closed set of delivery protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Email,
    Fcm,
    GoogleChat,
    Jira,
    Matrix,
    Mastodon,
    Mattermost,
    MsTeams,
    NextcloudTalk,
    RocketChat,
    Signal,
    Slack,
    Smtp2Go,
    Telegram,
    WhatsApp,
    Zulip,
    Discord,
    Webhook,
    Apprise,
}

wire_names!(ServiceKind {
    Email => "email",
    Fcm => "fcm",
    GoogleChat => "googlechat",
    Jira => "jira",
    Matrix => "matrix",
    Mastodon => "mastodon",
    Mattermost => "mattermost",
    MsTeams => "msteams",
    NextcloudTalk => "nextcloudtalk",
    RocketChat => "rocketchat",
    Signal => "signal",
    Slack => "slack",
    Smtp2Go => "smtp2go",
    Telegram => "telegram",
    WhatsApp => "whatsapp",
    Zulip => "zulip",
    Discord => "discord",
    Webhook => "webhook",
    Apprise => "apprise",
});

impl ServiceKind {
    /// All kinds in catalog declaration order
    pub const ALL: [ServiceKind; 19] = [
        ServiceKind::Email,
        ServiceKind::Fcm,
        ServiceKind::GoogleChat,
        ServiceKind::Jira,
        ServiceKind::Matrix,
        ServiceKind::Mastodon,
        ServiceKind::Mattermost,
        ServiceKind::MsTeams,
        ServiceKind::NextcloudTalk,
        ServiceKind::RocketChat,
        ServiceKind::Signal,
        ServiceKind::Slack,
        ServiceKind::Smtp2Go,
        ServiceKind::Telegram,
        ServiceKind::WhatsApp,
        ServiceKind::Zulip,
        ServiceKind::Discord,
        ServiceKind::Webhook,
        ServiceKind::Apprise,
    ];
}

/// A service `type` as persisted.
///
/// Known kinds are parsed case-insensitively. Anything else is kept verbatim
/// so locally added protocol schemas survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceType {
    Known(ServiceKind),
    Custom(String),
}

impl ServiceType {
    pub fn from_wire(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ServiceType::default();
        }
        match trimmed.parse::<ServiceKind>() {
            Ok(kind) => ServiceType::Known(kind),
            Err(_) => ServiceType::Custom(trimmed.to_string()),
        }
    }

    pub fn kind(&self) -> Option<ServiceKind> {
        match self {
            ServiceType::Known(kind) => Some(*kind),
            ServiceType::Custom(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceType::Known(kind) => kind.as_str(),
            ServiceType::Custom(name) => name,
        }
    }
}

impl Default for ServiceType {
    fn default() -> Self {
        ServiceType::Known(ServiceKind::Webhook)
    }
}

impl From<ServiceKind> for ServiceType {
    fn from(kind: ServiceKind) -> Self {
        ServiceType::Known(kind)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ServiceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ServiceType::from_wire(&raw))
    }
}

/// A named system event category notifications can subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label_key: String,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub domain: TriggerDomain,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub severity: Severity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_enabled: bool,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_system: bool,
}

/// One configuration field of a protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFieldSchema {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label_key: String,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub input_type: InputType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secret: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repeatable: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub placeholder: String,
}

/// Form description of one protocol kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<ServiceFieldSchema>,
}

/// Result of the last manual test of a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationServiceTestResult {
    #[serde(default, deserialize_with = "lenient_enum")]
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested_at: Option<String>,
}

/// One configured delivery protocol instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationServiceConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub service_type: ServiceType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: ServiceSettings,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secrets_ref: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_test_result: NotificationServiceTestResult,
}

impl NotificationServiceConfig {
    /// Create an enabled, empty service of the given kind
    pub fn new(kind: ServiceKind) -> Self {
        Self {
            id: String::new(),
            service_type: ServiceType::Known(kind),
            display_name: String::new(),
            enabled: true,
            settings: ServiceSettings::new(),
            secrets_ref: BTreeMap::new(),
            last_test_result: NotificationServiceTestResult::default(),
        }
    }

    /// Set the service id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set one raw field value
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Set the enabled flag
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Declared per-channel throttling intent. Zero disables a limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPolicy {
    #[serde(default, deserialize_with = "non_negative")]
    pub cooldown_seconds: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub dedup_window_seconds: u32,
    #[serde(default, deserialize_with = "non_negative")]
    pub max_per_minute: u32,
}

impl NotificationPolicy {
    /// True when no limit is configured
    pub fn is_unrestricted(&self) -> bool {
        self.cooldown_seconds == 0 && self.dedup_window_seconds == 0 && self.max_per_minute == 0
    }
}

/// A named bundle of subscribed triggers, delivery services and policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub category: ChannelCategory,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "string_list")]
    pub trigger_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<NotificationServiceConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub policy: NotificationPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl NotificationChannel {
    /// Create an active channel with no subscriptions or services
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: ChannelCategory::default(),
            is_active: true,
            trigger_ids: Vec::new(),
            services: Vec::new(),
            policy: NotificationPolicy::default(),
            created_at: None,
            updated_at: None,
            updated_by: None,
        }
    }

    /// Exact-match subscription test. Ids are not hierarchical.
    pub fn subscribes_to(&self, trigger_id: &str) -> bool {
        self.trigger_ids.iter().any(|id| id == trigger_id)
    }
}

/// Root settings aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawNotificationSettings")]
pub struct NotificationSettings {
    pub version: u32,
    pub channels: Vec<NotificationChannel>,
    pub saved_service_profiles: Vec<NotificationServiceConfig>,
    pub trigger_catalog: Vec<Trigger>,
    pub service_type_schemas: Vec<ServiceTypeSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            version: 1,
            channels: Vec::new(),
            saved_service_profiles: Vec::new(),
            trigger_catalog: Vec::new(),
            service_type_schemas: Vec::new(),
            updated_at: None,
            updated_by: None,
        }
    }
}

/// Wire shape accepted on read, including the legacy `serviceProfiles` key
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNotificationSettings {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    channels: Option<Vec<NotificationChannel>>,
    #[serde(default)]
    saved_service_profiles: Option<Value>,
    #[serde(default)]
    service_profiles: Option<Value>,
    #[serde(default)]
    trigger_catalog: Option<Vec<Trigger>>,
    #[serde(default)]
    service_type_schemas: Option<Vec<ServiceTypeSchema>>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    updated_by: Option<String>,
}

impl From<RawNotificationSettings> for NotificationSettings {
    fn from(raw: RawNotificationSettings) -> Self {
        let profiles = raw
            .saved_service_profiles
            .or(raw.service_profiles)
            .map(normalize_service_profiles)
            .unwrap_or_default();

        Self {
            version: raw.version.unwrap_or(1),
            channels: raw.channels.unwrap_or_default(),
            saved_service_profiles: profiles,
            trigger_catalog: raw.trigger_catalog.unwrap_or_default(),
            service_type_schemas: raw.service_type_schemas.unwrap_or_default(),
            updated_at: raw.updated_at,
            updated_by: raw.updated_by,
        }
    }
}

fn default_true() -> bool {
    true
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

fn non_negative<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(raw.clamp(0, u32::MAX as i64) as u32)
}

fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        _ => T::default(),
    })
}

/// String list that skips null and non-string items instead of failing
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    })
}
