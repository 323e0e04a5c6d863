use serde_json::Value;

use crate::catalog::FieldDef;
use crate::notification::ServiceSettings;

/// Typed view over a service's raw settings map.
pub struct FieldReader<'a> {
    settings: &'a ServiceSettings,
}

impl<'a> FieldReader<'a> {
    pub fn new(settings: &'a ServiceSettings) -> Self {
        Self { settings }
    }

    /// Trimmed scalar value; blank, null and structured values are missing.
    pub fn scalar(&self, key: &str) -> Option<String> {
        self.settings.get(key).and_then(scalar_text)
    }

    /// Repeatable value as an ordered list.
    ///
    /// Accepts a JSON array or a comma-joined string. Items are trimmed and
    /// blanks dropped; order and duplicates are kept.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.settings.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            Some(Value::String(joined)) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(other) => scalar_text(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Whether a field has a usable value
    pub fn is_present(&self, field: &FieldDef) -> bool {
        if field.repeatable {
            !self.list(field.key).is_empty()
        } else {
            self.scalar(field.key).is_some()
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
