//! Settings migration against the baseline catalogs.

use std::collections::HashSet;

use crate::notification::{NotificationSettings, ServiceType};

use super::defaults::{default_service_schemas, default_triggers};

/// Bring a persisted settings document up to the current baseline.
///
/// Triggers merge additively: existing entries are kept verbatim and in
/// order, missing baseline ids are appended. Schemas are
/// defaults-authoritative: one baseline schema per known kind, followed by
/// any custom-typed schemas the document carried. Schemas without a type are
/// dropped.
pub fn apply_defaults(settings: Option<NotificationSettings>) -> NotificationSettings {
    let mut settings = settings.unwrap_or_default();
    if settings.version == 0 {
        settings.version = 1;
    }

    let defaults = default_triggers();
    if settings.trigger_catalog.is_empty() {
        settings.trigger_catalog = defaults;
    } else {
        let present: HashSet<String> = settings
            .trigger_catalog
            .iter()
            .map(|t| t.id.clone())
            .collect();
        let missing: Vec<_> = defaults
            .into_iter()
            .filter(|t| !present.contains(&t.id))
            .collect();
        settings.trigger_catalog.extend(missing);
    }

    let mut schemas = default_service_schemas();
    let baseline: HashSet<ServiceType> = schemas
        .iter()
        .filter_map(|s| s.service_type.clone())
        .collect();
    let custom = std::mem::take(&mut settings.service_type_schemas)
        .into_iter()
        .filter(|s| match &s.service_type {
            Some(service_type) => !baseline.contains(service_type),
            None => false,
        });
    schemas.extend(custom);
    settings.service_type_schemas = schemas;

    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::defaults::default_service_schema;
    use crate::notification::{ServiceKind, ServiceTypeSchema, Severity, Trigger, TriggerDomain};

    fn custom_trigger(id: &str) -> Trigger {
        Trigger {
            id: id.to_string(),
            label_key: "custom.label".to_string(),
            domain: TriggerDomain::System,
            severity: Severity::Critical,
            default_enabled: true,
            is_system: false,
        }
    }

    #[test]
    fn test_absent_settings_get_full_catalogs() {
        let settings = apply_defaults(None);
        assert_eq!(settings.version, 1);
        assert!(settings.channels.is_empty());
        assert_eq!(settings.trigger_catalog.len(), 42);
        assert_eq!(settings.service_type_schemas.len(), 19);
    }

    #[test]
    fn test_stored_lider_user_triggers_are_not_duplicated() {
        let input = NotificationSettings {
            trigger_catalog: vec![
                custom_trigger("system.lider_user.password.changed"),
                custom_trigger("system.lider_user.updated"),
            ],
            ..NotificationSettings::default()
        };
        let merged = apply_defaults(Some(input));

        assert_eq!(merged.trigger_catalog.len(), 42);
        assert_eq!(merged.trigger_catalog[0].id, "system.lider_user.password.changed");
    }

    #[test]
    fn test_trigger_merge_is_additive() {
        let mut overridden = custom_trigger("task.failed");
        overridden.severity = Severity::Info;

        let input = NotificationSettings {
            trigger_catalog: vec![custom_trigger("custom.first"), overridden.clone()],
            ..NotificationSettings::default()
        };
        let merged = apply_defaults(Some(input));

        assert_eq!(merged.trigger_catalog.len(), 43);
        assert_eq!(merged.trigger_catalog[0].id, "custom.first");
        assert_eq!(merged.trigger_catalog[1], overridden);
        let failed_count = merged
            .trigger_catalog
            .iter()
            .filter(|t| t.id == "task.failed")
            .count();
        assert_eq!(failed_count, 1);
    }

    #[test]
    fn test_schema_merge_defaults_authoritative() {
        let mut stale_slack = default_service_schema(ServiceKind::Slack);
        stale_slack.fields.truncate(1);
        stale_slack.label_key = "stale".to_string();

        let custom = ServiceTypeSchema {
            service_type: Some(ServiceType::Custom("pager".to_string())),
            label_key: "pager.label".to_string(),
            fields: Vec::new(),
        };
        let untyped = ServiceTypeSchema {
            service_type: None,
            label_key: "orphan".to_string(),
            fields: Vec::new(),
        };

        let input = NotificationSettings {
            service_type_schemas: vec![custom.clone(), stale_slack, untyped],
            ..NotificationSettings::default()
        };
        let merged = apply_defaults(Some(input));

        assert_eq!(merged.service_type_schemas.len(), 20);
        assert_eq!(merged.service_type_schemas[19], custom);
        let slack = merged
            .service_type_schemas
            .iter()
            .find(|s| s.service_type == Some(ServiceType::Known(ServiceKind::Slack)))
            .unwrap();
        assert_eq!(*slack, default_service_schema(ServiceKind::Slack));
        assert!(merged.service_type_schemas.iter().all(|s| s.label_key != "orphan"));
    }

    #[test]
    fn test_migration_is_idempotent() {
        let input = NotificationSettings {
            version: 0,
            trigger_catalog: vec![custom_trigger("custom.first")],
            service_type_schemas: vec![ServiceTypeSchema {
                service_type: Some(ServiceType::Custom("pager".to_string())),
                label_key: String::new(),
                fields: Vec::new(),
            }],
            ..NotificationSettings::default()
        };

        let once = apply_defaults(Some(input));
        let twice = apply_defaults(Some(once.clone()));
        assert_eq!(once, twice);
        assert_eq!(once.version, 1);
    }
}
