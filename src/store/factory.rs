//! Settings store factory

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::redis::pool::RedisPool;

use super::file::FileSettingsStore;
use super::memory::MemorySettingsStore;
use super::redis_store::RedisSettingsStore;
use super::SettingsStore;

/// Create a settings store based on configuration.
///
/// - `"file"`: JSON document at `store.path`
/// - `"redis"`: `store.redis_key` through the given pool, memory when no pool
/// - `"memory"` (default) and anything unrecognised: in-process store
pub fn create_settings_store(
    config: &StoreConfig,
    redis_pool: Option<Arc<RedisPool>>,
) -> Arc<dyn SettingsStore> {
    match config.backend.as_str() {
        "file" => {
            tracing::info!(backend = "file", path = %config.path, "Creating file settings store");
            Arc::new(FileSettingsStore::new(&config.path))
        }
        "redis" => {
            if let Some(pool) = redis_pool {
                tracing::info!(
                    backend = "redis",
                    key = %config.redis_key,
                    "Creating Redis settings store"
                );
                Arc::new(RedisSettingsStore::new(pool, config.redis_key.clone()))
            } else {
                tracing::warn!(
                    "Redis settings store requested but Redis is not configured, falling back to memory"
                );
                Arc::new(MemorySettingsStore::new())
            }
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating memory settings store");
            Arc::new(MemorySettingsStore::new())
        }
        other => {
            tracing::warn!(backend = %other, "Unknown settings store backend, using memory");
            Arc::new(MemorySettingsStore::new())
        }
    }
}
