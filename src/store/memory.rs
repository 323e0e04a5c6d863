use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::notification::NotificationSettings;

use super::{SettingsStore, StoreError};

/// In-process settings snapshot. Contents are lost on restart.
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: RwLock<Option<NotificationSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already stored document
    pub fn with_settings(settings: NotificationSettings) -> Self {
        Self {
            settings: RwLock::new(Some(settings)),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Option<NotificationSettings>, StoreError> {
        Ok(self.settings.read().await.clone())
    }

    async fn save(&self, settings: &NotificationSettings) -> Result<(), StoreError> {
        *self.settings.write().await = Some(settings.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_ok, block_on};

    #[test]
    fn test_empty_then_saved() {
        let store = MemorySettingsStore::new();
        assert_eq!(assert_ok!(block_on(store.load())), None);

        let settings = NotificationSettings::default();
        assert_ok!(block_on(store.save(&settings)));
        assert_eq!(assert_ok!(block_on(store.load())), Some(settings));
    }

    #[tokio::test]
    async fn test_load_returns_owned_snapshot() {
        let store = MemorySettingsStore::with_settings(NotificationSettings::default());

        let mut snapshot = store.load().await.unwrap().unwrap();
        snapshot.version = 9;
        assert_eq!(store.load().await.unwrap().unwrap().version, 1);
    }
}
