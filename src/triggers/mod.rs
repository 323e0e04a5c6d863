//! Trigger intake: HTTP endpoint and Redis Pub/Sub subscriber.

mod http;
mod redis;

use serde::Deserialize;

pub use http::trigger_dispatch;
pub use redis::{parse_trigger_message, RedisSubscriber};

/// A trigger occurrence to dispatch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMessage {
    #[serde(alias = "trigger_id")]
    pub trigger_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}
