use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::notification::NotificationDispatcher;
use crate::policy::PolicyGate;
use crate::redis::RedisPool;
use crate::store::SettingsStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub redis_pool: Option<Arc<RedisPool>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            settings: Arc::new(settings),
            dispatcher,
            redis_pool: None,
            start_time: Instant::now(),
        }
    }

    pub fn with_redis_pool(mut self, pool: Arc<RedisPool>) -> Self {
        self.redis_pool = Some(pool);
        self
    }

    /// Settings store shared with the dispatcher
    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        self.dispatcher.store()
    }

    pub fn policy_gate(&self) -> Option<&Arc<PolicyGate>> {
        self.dispatcher.policy_gate()
    }
}
