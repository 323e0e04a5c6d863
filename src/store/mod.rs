//! Settings persistence.
//!
//! A [`SettingsStore`] holds one JSON settings document. Backends:
//!
//! - `MemorySettingsStore`: in-process snapshot (default)
//! - `FileSettingsStore`: JSON file, replaced atomically on save
//! - `RedisSettingsStore`: JSON string under a single Redis key
//!
//! Use [`create_settings_store`] to pick one from configuration.

mod factory;
mod file;
mod memory;
mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::apply_defaults;
use crate::metrics::StoreMetrics;
use crate::notification::NotificationSettings;
use crate::redis::PoolError;

pub use factory::create_settings_store;
pub use file::FileSettingsStore;
pub use memory::MemorySettingsStore;
pub use redis_store::RedisSettingsStore;

/// Errors that can occur during settings store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] PoolError),

    /// Backend is temporarily unavailable
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for the settings document
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the stored document; `None` when nothing was saved yet
    async fn load(&self) -> Result<Option<NotificationSettings>, StoreError>;

    /// Replace the stored document
    async fn save(&self, settings: &NotificationSettings) -> Result<(), StoreError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Dispatch-time load: always yields a complete, migrated snapshot.
///
/// Store failures and unreadable documents are logged and replaced by the
/// baseline defaults so a broken store never blocks dispatch.
pub async fn load_settings(store: &dyn SettingsStore) -> NotificationSettings {
    match store.load().await {
        Ok(stored) => apply_defaults(stored),
        Err(e) => {
            StoreMetrics::record_load_failure();
            tracing::error!(
                backend = store.backend_name(),
                error = %e,
                "Failed to load notification settings, using defaults"
            );
            apply_defaults(None)
        }
    }
}

/// Startup load: migrate the stored document and write it back once so the
/// persisted catalogs are current.
pub async fn bootstrap_settings(
    store: &dyn SettingsStore,
) -> Result<NotificationSettings, StoreError> {
    let stored = store.load().await?;
    let created = stored.is_none();
    let settings = apply_defaults(stored);
    store.save(&settings).await?;
    StoreMetrics::record_save();

    tracing::info!(
        backend = store.backend_name(),
        created = created,
        channels = settings.channels.len(),
        triggers = settings.trigger_catalog.len(),
        "Notification settings ready"
    );
    Ok(settings)
}
