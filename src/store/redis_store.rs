use std::sync::Arc;

use async_trait::async_trait;

use crate::notification::NotificationSettings;
use crate::redis::pool::RedisPool;

use super::{SettingsStore, StoreError};

/// Settings document stored as a JSON string under one Redis key
pub struct RedisSettingsStore {
    pool: Arc<RedisPool>,
    key: String,
}

impl RedisSettingsStore {
    pub fn new(pool: Arc<RedisPool>, key: impl Into<String>) -> Self {
        Self {
            pool,
            key: key.into(),
        }
    }
}

#[async_trait]
impl SettingsStore for RedisSettingsStore {
    async fn load(&self) -> Result<Option<NotificationSettings>, StoreError> {
        match self.pool.get_string(&self.key).await? {
            Some(text) if !text.trim().is_empty() => Ok(Some(serde_json::from_str(&text)?)),
            _ => Ok(None),
        }
    }

    async fn save(&self, settings: &NotificationSettings) -> Result<(), StoreError> {
        let payload = serde_json::to_string(settings)?;
        self.pool.set_string(&self.key, payload).await?;
        tracing::debug!(key = %self.key, "Settings written to Redis");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
