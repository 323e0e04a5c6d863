//! Normalization of saved service profiles.
//!
//! Older documents stored profiles under `serviceProfiles`, sometimes as a
//! single object and sometimes JSON-encoded into a string. Everything is
//! reduced to a plain list here; anything unreadable is dropped.

use serde_json::Value;

use super::types::NotificationServiceConfig;

pub(crate) fn normalize_service_profiles(raw: Value) -> Vec<NotificationServiceConfig> {
    match raw {
        Value::Array(items) => items.into_iter().filter_map(convert_profile).collect(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.starts_with('[') {
                match serde_json::from_str::<Vec<Value>>(trimmed) {
                    Ok(items) => items.into_iter().filter_map(convert_profile).collect(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Discarding unreadable service profile list");
                        Vec::new()
                    }
                }
            } else {
                convert_profile(Value::String(text)).into_iter().collect()
            }
        }
        object @ Value::Object(_) => convert_profile(object).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn convert_profile(item: Value) -> Option<NotificationServiceConfig> {
    let parsed = match item {
        Value::Null => return None,
        Value::String(text) => {
            let trimmed = text.trim();
            if !trimmed.starts_with('{') {
                return None;
            }
            serde_json::from_str(trimmed)
        }
        other => serde_json::from_value(other),
    };

    match parsed {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping unconvertible service profile");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{ServiceKind, ServiceType};
    use serde_json::json;

    #[test]
    fn test_array_of_objects() {
        let profiles = normalize_service_profiles(json!([
            {"id": "a", "type": "slack"},
            {"id": "b", "type": "telegram"}
        ]));
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].service_type, ServiceType::Known(ServiceKind::Telegram));
    }

    #[test]
    fn test_single_object() {
        let profiles = normalize_service_profiles(json!({"id": "solo"}));
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id, "solo");
    }

    #[test]
    fn test_string_encoded_array_with_string_items() {
        let encoded = r#" [{"id":"a"}, "{\"id\":\"b\"}", "garbage", null, 7] "#;
        let profiles = normalize_service_profiles(Value::String(encoded.to_string()));
        let ids: Vec<_> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_string_encoded_object() {
        let profiles = normalize_service_profiles(json!(r#"{"id":"enc","type":"discord"}"#));
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id, "enc");
    }

    #[test]
    fn test_garbage_is_discarded() {
        assert!(normalize_service_profiles(json!("[not json")).is_empty());
        assert!(normalize_service_profiles(json!("plain text")).is_empty());
        assert!(normalize_service_profiles(json!(42)).is_empty());
        assert!(normalize_service_profiles(json!(true)).is_empty());
    }
}
