//! Baseline trigger catalog and protocol field tables.
//!
//! The tables are static; the public functions build fresh owned values on
//! every call so callers can mutate the result freely.

use crate::notification::{
    InputType, NotificationSettings, ServiceFieldSchema, ServiceKind, ServiceType,
    ServiceTypeSchema, Severity, Trigger, TriggerDomain,
};

const TRIGGER_LABEL_PREFIX: &str = "settings.server_settings.notification_settings.trigger_labels.";

macro_rules! dialog_label {
    ($suffix:literal) => {
        concat!("settings.server_settings.notification_settings.dialog.", $suffix)
    };
}

/// Static description of one protocol field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub key: &'static str,
    pub label_key: &'static str,
    pub input_type: InputType,
    pub required: bool,
    pub secret: bool,
    pub repeatable: bool,
    pub placeholder: &'static str,
}

impl FieldDef {
    const fn text(
        key: &'static str,
        label_key: &'static str,
        required: bool,
        repeatable: bool,
        placeholder: &'static str,
    ) -> Self {
        Self {
            key,
            label_key,
            input_type: InputType::Text,
            required,
            secret: false,
            repeatable,
            placeholder,
        }
    }

    const fn secret(key: &'static str, label_key: &'static str, required: bool) -> Self {
        Self::secret_with_placeholder(key, label_key, required, "")
    }

    const fn secret_with_placeholder(
        key: &'static str,
        label_key: &'static str,
        required: bool,
        placeholder: &'static str,
    ) -> Self {
        Self {
            key,
            label_key,
            input_type: InputType::Password,
            required,
            secret: true,
            repeatable: false,
            placeholder,
        }
    }

    fn to_schema(self) -> ServiceFieldSchema {
        ServiceFieldSchema {
            key: self.key.to_string(),
            label_key: self.label_key.to_string(),
            input_type: self.input_type,
            required: self.required,
            secret: self.secret,
            repeatable: self.repeatable,
            placeholder: self.placeholder.to_string(),
        }
    }
}

const REQUIRED: bool = true;
const OPTIONAL: bool = false;
const SINGLE: bool = false;
const REPEATED: bool = true;

static EMAIL_FIELDS: [FieldDef; 9] = [
    FieldDef::text("user", dialog_label!("email_user"), REQUIRED, SINGLE, "myuser"),
    FieldDef::secret("password", dialog_label!("email_password"), REQUIRED),
    FieldDef::text("domain", dialog_label!("email_domain"), REQUIRED, SINGLE, "gmail.com"),
    FieldDef::text("smtp", dialog_label!("email_smtp"), OPTIONAL, SINGLE, "smtp.gmail.com"),
    FieldDef::text("port", dialog_label!("email_port"), OPTIONAL, SINGLE, "587"),
    FieldDef::text("from", dialog_label!("email_from"), OPTIONAL, SINGLE, "noreply@example.com"),
    FieldDef::text("to", dialog_label!("email_to"), REQUIRED, REPEATED, "recipient@example.com"),
    FieldDef::text("cc", dialog_label!("email_cc"), OPTIONAL, REPEATED, ""),
    FieldDef::text("bcc", dialog_label!("email_bcc"), OPTIONAL, REPEATED, ""),
];

static FCM_FIELDS: [FieldDef; 2] = [
    FieldDef::secret("apiKey", dialog_label!("fcm_api_key"), REQUIRED),
    FieldDef::text("devices", dialog_label!("fcm_device"), REQUIRED, REPEATED, "device-id"),
];

static GOOGLECHAT_FIELDS: [FieldDef; 3] = [
    FieldDef::text("workspace", dialog_label!("gchat_workspace"), REQUIRED, SINGLE, ""),
    FieldDef::secret("webhookKey", dialog_label!("gchat_webhook_key"), REQUIRED),
    FieldDef::secret("webhookToken", dialog_label!("gchat_webhook_token"), REQUIRED),
];

static JIRA_FIELDS: [FieldDef; 2] = [
    FieldDef::secret("apiKey", dialog_label!("jira_api_key"), REQUIRED),
    FieldDef::text(
        "targets",
        dialog_label!("jira_target"),
        OPTIONAL,
        REPEATED,
        "@user or #team or *schedule",
    ),
];

static MATRIX_FIELDS: [FieldDef; 4] = [
    FieldDef::text("user", dialog_label!("matrix_user"), REQUIRED, SINGLE, ""),
    FieldDef::secret("password", dialog_label!("matrix_password"), REQUIRED),
    FieldDef::text("hostname", dialog_label!("host_name"), REQUIRED, SINGLE, "matrix.org"),
    FieldDef::text("roomAlias", dialog_label!("matrix_room_alias"), REQUIRED, SINGLE, "#general"),
];

static MASTODON_FIELDS: [FieldDef; 3] = [
    FieldDef::secret("token", dialog_label!("mastodon_token"), REQUIRED),
    FieldDef::text("host", dialog_label!("host_name"), REQUIRED, SINGLE, "mastodon.social"),
    FieldDef::text("targets", dialog_label!("mastodon_target"), OPTIONAL, REPEATED, "@user@instance"),
];

static MATTERMOST_FIELDS: [FieldDef; 5] = [
    FieldDef::text("hostname", dialog_label!("host_name"), REQUIRED, SINGLE, "mattermost.example.com"),
    FieldDef::secret("token", dialog_label!("mattermost_token"), REQUIRED),
    FieldDef::text("botname", dialog_label!("mattermost_botname"), OPTIONAL, SINGLE, ""),
    FieldDef::text("port", dialog_label!("port"), OPTIONAL, SINGLE, ""),
    FieldDef::text("channel", dialog_label!("channel"), OPTIONAL, SINGLE, ""),
];

static MSTEAMS_FIELDS: [FieldDef; 4] = [
    FieldDef::text("team", dialog_label!("msteams_team"), REQUIRED, SINGLE, ""),
    FieldDef::secret("tokenA", dialog_label!("msteams_token_a"), REQUIRED),
    FieldDef::secret("tokenB", dialog_label!("msteams_token_b"), REQUIRED),
    FieldDef::secret("tokenC", dialog_label!("msteams_token_c"), REQUIRED),
];

static NEXTCLOUDTALK_FIELDS: [FieldDef; 5] = [
    FieldDef::text("user", dialog_label!("nctalk_user"), REQUIRED, SINGLE, ""),
    FieldDef::secret("password", dialog_label!("nctalk_password"), REQUIRED),
    FieldDef::text("hostname", dialog_label!("host_name"), REQUIRED, SINGLE, "cloud.example.com"),
    FieldDef::text("port", dialog_label!("port"), OPTIONAL, SINGLE, ""),
    FieldDef::text("roomId", dialog_label!("nctalk_room_id"), REQUIRED, SINGLE, ""),
];

static ROCKETCHAT_FIELDS: [FieldDef; 5] = [
    FieldDef::text("hostname", dialog_label!("host_name"), REQUIRED, SINGLE, "rocket.example.com"),
    FieldDef::text("user", dialog_label!("rocketchat_user"), OPTIONAL, SINGLE, ""),
    FieldDef::secret("password", dialog_label!("rocketchat_password"), OPTIONAL),
    FieldDef::secret("webhook", dialog_label!("rocketchat_webhook"), OPTIONAL),
    FieldDef::text(
        "targets",
        dialog_label!("rocketchat_target"),
        REQUIRED,
        REPEATED,
        "#general or @user",
    ),
];

static SIGNAL_FIELDS: [FieldDef; 5] = [
    FieldDef::text("user", dialog_label!("signal_user"), REQUIRED, SINGLE, ""),
    FieldDef::secret("password", dialog_label!("signal_password"), REQUIRED),
    FieldDef::text("hostname", dialog_label!("host_name"), REQUIRED, SINGLE, ""),
    FieldDef::text("fromPhone", dialog_label!("signal_from_phone"), REQUIRED, SINGLE, "+1234567890"),
    FieldDef::text("targets", dialog_label!("signal_target"), OPTIONAL, REPEATED, "+1234567890"),
];

static SLACK_FIELDS: [FieldDef; 3] = [
    FieldDef::secret_with_placeholder("tokenA", dialog_label!("slack_token_a"), REQUIRED, "T00000000"),
    FieldDef::secret_with_placeholder("tokenB", dialog_label!("slack_token_b"), REQUIRED, "B00000000"),
    FieldDef::secret_with_placeholder("tokenC", dialog_label!("slack_token_c"), REQUIRED, "XXXXXXXX"),
];

static SMTP2GO_FIELDS: [FieldDef; 4] = [
    FieldDef::text("user", dialog_label!("smtp2go_user"), REQUIRED, SINGLE, "sender"),
    FieldDef::text("domain", dialog_label!("smtp2go_domain"), REQUIRED, SINGLE, "example.com"),
    FieldDef::secret("apiKey", dialog_label!("smtp2go_apikey"), REQUIRED),
    FieldDef::text("to", dialog_label!("smtp2go_to"), REQUIRED, REPEATED, "recipient@example.com"),
];

static TELEGRAM_FIELDS: [FieldDef; 2] = [
    FieldDef::secret("botToken", dialog_label!("telegram_bot_token"), REQUIRED),
    FieldDef::text("chatIds", dialog_label!("telegram_chat_id"), REQUIRED, REPEATED, "123456789"),
];

static WHATSAPP_FIELDS: [FieldDef; 3] = [
    FieldDef::secret("token", dialog_label!("whatsapp_token"), REQUIRED),
    FieldDef::text("fromPhoneId", dialog_label!("whatsapp_from_phone"), REQUIRED, SINGLE, ""),
    FieldDef::text("targets", dialog_label!("whatsapp_target"), REQUIRED, REPEATED, "+1234567890"),
];

static ZULIP_FIELDS: [FieldDef; 4] = [
    FieldDef::text("botname", dialog_label!("zulip_botname"), REQUIRED, SINGLE, ""),
    FieldDef::text("organization", dialog_label!("zulip_organization"), REQUIRED, SINGLE, ""),
    FieldDef::secret("token", dialog_label!("zulip_token"), REQUIRED),
    FieldDef::text(
        "targets",
        dialog_label!("zulip_target"),
        OPTIONAL,
        REPEATED,
        "#stream or user@example.com",
    ),
];

static DISCORD_FIELDS: [FieldDef; 2] = [
    FieldDef::text("webhookId", dialog_label!("discord_webhook_id"), REQUIRED, SINGLE, ""),
    FieldDef::secret("webhookToken", dialog_label!("discord_webhook_token"), REQUIRED),
];

static WEBHOOK_FIELDS: [FieldDef; 1] = [FieldDef::text(
    "url",
    dialog_label!("webhook_url"),
    REQUIRED,
    SINGLE,
    "https://example.com/webhook",
)];

static APPRISE_FIELDS: [FieldDef; 1] = [FieldDef::text(
    "url",
    dialog_label!("apprise_url"),
    REQUIRED,
    SINGLE,
    "tgram://bot_token/chat_id",
)];

/// Baseline fields of a protocol, in declaration order
pub fn field_defs(kind: ServiceKind) -> &'static [FieldDef] {
    match kind {
        ServiceKind::Email => &EMAIL_FIELDS,
        ServiceKind::Fcm => &FCM_FIELDS,
        ServiceKind::GoogleChat => &GOOGLECHAT_FIELDS,
        ServiceKind::Jira => &JIRA_FIELDS,
        ServiceKind::Matrix => &MATRIX_FIELDS,
        ServiceKind::Mastodon => &MASTODON_FIELDS,
        ServiceKind::Mattermost => &MATTERMOST_FIELDS,
        ServiceKind::MsTeams => &MSTEAMS_FIELDS,
        ServiceKind::NextcloudTalk => &NEXTCLOUDTALK_FIELDS,
        ServiceKind::RocketChat => &ROCKETCHAT_FIELDS,
        ServiceKind::Signal => &SIGNAL_FIELDS,
        ServiceKind::Slack => &SLACK_FIELDS,
        ServiceKind::Smtp2Go => &SMTP2GO_FIELDS,
        ServiceKind::Telegram => &TELEGRAM_FIELDS,
        ServiceKind::WhatsApp => &WHATSAPP_FIELDS,
        ServiceKind::Zulip => &ZULIP_FIELDS,
        ServiceKind::Discord => &DISCORD_FIELDS,
        ServiceKind::Webhook => &WEBHOOK_FIELDS,
        ServiceKind::Apprise => &APPRISE_FIELDS,
    }
}

// (id, domain, severity, enabled by default)
static TRIGGERS: [(&str, TriggerDomain, Severity, bool); 42] = [
    ("task.executed", TriggerDomain::Task, Severity::Info, true),
    ("task.failed", TriggerDomain::Task, Severity::Error, false),
    ("task.completed", TriggerDomain::Task, Severity::Info, false),
    ("task.scheduled.created", TriggerDomain::Task, Severity::Info, false),
    ("task.scheduled.updated", TriggerDomain::Task, Severity::Info, false),
    ("task.scheduled.cancelled", TriggerDomain::Task, Severity::Warning, false),
    ("policy.applied", TriggerDomain::Policy, Severity::Info, false),
    ("policy.unassigned", TriggerDomain::Policy, Severity::Warning, false),
    ("policy.exception.created", TriggerDomain::Policy, Severity::Info, false),
    ("policy.exception.deleted", TriggerDomain::Policy, Severity::Warning, false),
    ("agent.registered", TriggerDomain::Agent, Severity::Info, true),
    ("agent.unregistered", TriggerDomain::Agent, Severity::Warning, false),
    ("agent.online", TriggerDomain::Agent, Severity::Info, false),
    ("agent.offline", TriggerDomain::Agent, Severity::Info, false),
    ("agent.ou.created", TriggerDomain::Agent, Severity::Info, false),
    ("agent.ou.deleted", TriggerDomain::Agent, Severity::Warning, false),
    ("agent.group.created", TriggerDomain::Agent, Severity::Info, false),
    ("agent.group.updated", TriggerDomain::Agent, Severity::Info, false),
    ("agent.group.deleted", TriggerDomain::Agent, Severity::Warning, false),
    ("agent.group.moved", TriggerDomain::Agent, Severity::Info, false),
    ("user.login.failed", TriggerDomain::User, Severity::Warning, false),
    ("user.created", TriggerDomain::User, Severity::Info, true),
    ("user.updated", TriggerDomain::User, Severity::Info, false),
    ("user.deleted", TriggerDomain::User, Severity::Warning, false),
    ("user.moved", TriggerDomain::User, Severity::Info, false),
    ("user.password.changed", TriggerDomain::User, Severity::Warning, false),
    ("user.password.forgot", TriggerDomain::User, Severity::Warning, false),
    ("user.login", TriggerDomain::User, Severity::Info, true),
    ("user.logout", TriggerDomain::User, Severity::Info, true),
    ("user.session.login", TriggerDomain::User, Severity::Info, false),
    ("user.session.logout", TriggerDomain::User, Severity::Info, false),
    ("user.group.created", TriggerDomain::User, Severity::Info, false),
    ("user.group.deleted", TriggerDomain::User, Severity::Warning, false),
    ("user.group.moved", TriggerDomain::User, Severity::Info, false),
    ("user.ad.created", TriggerDomain::User, Severity::Info, false),
    ("user.ad.updated", TriggerDomain::User, Severity::Info, false),
    ("user.ad.deleted", TriggerDomain::User, Severity::Warning, false),
    ("user.ad.password.changed", TriggerDomain::User, Severity::Warning, false),
    ("system.lider_user.password.changed", TriggerDomain::System, Severity::Warning, false),
    ("system.lider_user.updated", TriggerDomain::System, Severity::Info, false),
    ("system.server.created", TriggerDomain::System, Severity::Info, false),
    ("system.server.deleted", TriggerDomain::System, Severity::Warning, false),
];

/// Translation key for a trigger id
pub fn trigger_label_key(id: &str) -> String {
    format!("{}{}", TRIGGER_LABEL_PREFIX, id.replace('.', "_"))
}

/// Fresh copy of the baseline trigger catalog
pub fn default_triggers() -> Vec<Trigger> {
    TRIGGERS
        .iter()
        .map(|&(id, domain, severity, default_enabled)| Trigger {
            id: id.to_string(),
            label_key: trigger_label_key(id),
            domain,
            severity,
            default_enabled,
            is_system: true,
        })
        .collect()
}

/// Fresh copy of the baseline schema of one protocol
pub fn default_service_schema(kind: ServiceKind) -> ServiceTypeSchema {
    ServiceTypeSchema {
        service_type: Some(ServiceType::Known(kind)),
        label_key: format!(
            "{}service_types.{}",
            dialog_label!(""),
            kind.as_str()
        ),
        fields: field_defs(kind).iter().map(|f| f.to_schema()).collect(),
    }
}

/// Fresh copy of all baseline schemas, one per kind
pub fn default_service_schemas() -> Vec<ServiceTypeSchema> {
    ServiceKind::ALL
        .iter()
        .map(|&kind| default_service_schema(kind))
        .collect()
}

/// A complete settings document with both baseline catalogs
pub fn default_settings() -> NotificationSettings {
    NotificationSettings {
        trigger_catalog: default_triggers(),
        service_type_schemas: default_service_schemas(),
        ..NotificationSettings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_trigger_catalog_shape() {
        let triggers = default_triggers();
        assert_eq!(triggers.len(), 42);

        let ids: HashSet<_> = triggers.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 42, "trigger ids must be unique");
        assert!(ids.contains("system.lider_user.password.changed"));
        assert!(ids.contains("system.lider_user.updated"));
        assert!(triggers.iter().all(|t| t.is_system));

        let enabled: Vec<_> = triggers
            .iter()
            .filter(|t| t.default_enabled)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(
            enabled,
            vec!["task.executed", "agent.registered", "user.created", "user.login", "user.logout"]
        );
    }

    #[test]
    fn test_trigger_domains_match_prefix() {
        for trigger in default_triggers() {
            let prefix = trigger.id.split('.').next().unwrap();
            assert_eq!(prefix, trigger.domain.as_str(), "{}", trigger.id);
        }
    }

    #[test]
    fn test_trigger_label_key() {
        assert_eq!(
            trigger_label_key("task.scheduled.created"),
            "settings.server_settings.notification_settings.trigger_labels.task_scheduled_created"
        );
    }

    #[test]
    fn test_schema_per_kind() {
        let schemas = default_service_schemas();
        assert_eq!(schemas.len(), ServiceKind::ALL.len());

        let email = &schemas[0];
        assert_eq!(email.service_type, Some(ServiceType::Known(ServiceKind::Email)));
        assert_eq!(
            email.label_key,
            "settings.server_settings.notification_settings.dialog.service_types.email"
        );
        let keys: Vec<_> = email.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["user", "password", "domain", "smtp", "port", "from", "to", "cc", "bcc"]
        );
    }

    #[test]
    fn test_secret_fields_use_password_input() {
        for kind in ServiceKind::ALL {
            for field in field_defs(kind) {
                assert_eq!(field.secret, field.input_type == InputType::Password);
                assert!(!(field.secret && field.repeatable));
            }
        }
    }

    #[test]
    fn test_slack_token_placeholders() {
        let schema = default_service_schema(ServiceKind::Slack);
        let placeholders: Vec<_> = schema
            .fields
            .iter()
            .map(|f| (f.key.as_str(), f.placeholder.as_str(), f.secret))
            .collect();
        assert_eq!(
            placeholders,
            vec![
                ("tokenA", "T00000000", true),
                ("tokenB", "B00000000", true),
                ("tokenC", "XXXXXXXX", true),
            ]
        );
    }

    #[test]
    fn test_calls_return_independent_values() {
        let mut first = default_triggers();
        first[0].id = "mutated".to_string();
        assert_eq!(default_triggers()[0].id, "task.executed");
    }
}
