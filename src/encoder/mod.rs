//! Protocol URL encoder.
//!
//! Turns one [`NotificationServiceConfig`] into the addressing string the
//! delivery gateway understands. `None` means the service is skipped: its
//! type is custom, or a field the baseline schema marks required is missing.

mod fields;
mod protocols;

pub use fields::FieldReader;

use crate::catalog::field_defs;
use crate::notification::{NotificationServiceConfig, ServiceKind};

/// Encode one service into its protocol URL
pub fn encode(config: &NotificationServiceConfig) -> Option<String> {
    let kind = config.service_type.kind()?;
    let reader = FieldReader::new(&config.settings);

    if let Some(missing) = field_defs(kind)
        .iter()
        .find(|f| f.required && !reader.is_present(f))
    {
        tracing::debug!(
            service_id = %config.id,
            service_type = %kind,
            field = missing.key,
            "Service is missing a required field"
        );
        return None;
    }

    match kind {
        ServiceKind::Email => protocols::email(&reader),
        ServiceKind::Fcm => protocols::fcm(&reader),
        ServiceKind::GoogleChat => protocols::google_chat(&reader),
        ServiceKind::Jira => protocols::jira(&reader),
        ServiceKind::Matrix => protocols::matrix(&reader),
        ServiceKind::Mastodon => protocols::mastodon(&reader),
        ServiceKind::Mattermost => protocols::mattermost(&reader),
        ServiceKind::MsTeams => protocols::ms_teams(&reader),
        ServiceKind::NextcloudTalk => protocols::nextcloud_talk(&reader),
        ServiceKind::RocketChat => protocols::rocket_chat(&reader),
        ServiceKind::Signal => protocols::signal(&reader),
        ServiceKind::Slack => protocols::slack(&reader),
        ServiceKind::Smtp2Go => protocols::smtp2go(&reader),
        ServiceKind::Telegram => protocols::telegram(&reader),
        ServiceKind::WhatsApp => protocols::whatsapp(&reader),
        ServiceKind::Zulip => protocols::zulip(&reader),
        ServiceKind::Discord => protocols::discord(&reader),
        ServiceKind::Webhook | ServiceKind::Apprise => protocols::passthrough(&reader),
    }
}
