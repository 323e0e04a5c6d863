use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::broadcast;

use crate::config::RedisConfig;
use crate::metrics::TriggerMetrics;
use crate::notification::NotificationDispatcher;

use super::TriggerMessage;

/// Parse a Pub/Sub payload into a trigger; `None` when unusable.
pub fn parse_trigger_message(payload: &str) -> Option<TriggerMessage> {
    let mut message: TriggerMessage = match serde_json::from_str(payload) {
        Ok(m) => m,
        Err(e) => {
            TriggerMetrics::record_parse_error();
            tracing::warn!(error = %e, "Failed to parse trigger message");
            return None;
        }
    };

    message.trigger_id = message.trigger_id.trim().to_string();
    if message.trigger_id.is_empty() {
        TriggerMetrics::record_parse_error();
        tracing::warn!("Trigger message without triggerId");
        return None;
    }
    Some(message)
}

fn is_pattern(channel: &str) -> bool {
    channel.contains('*') || channel.contains('?') || channel.contains('[')
}

/// Redis Pub/Sub subscriber feeding the dispatcher
pub struct RedisSubscriber {
    config: RedisConfig,
    dispatcher: Arc<NotificationDispatcher>,
    shutdown: broadcast::Sender<()>,
}

impl RedisSubscriber {
    pub fn new(config: RedisConfig, dispatcher: Arc<NotificationDispatcher>) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        Self {
            config,
            dispatcher,
            shutdown,
        }
    }

    /// Get a shutdown signal sender
    pub fn shutdown_signal(&self) -> broadcast::Sender<()> {
        self.shutdown.clone()
    }

    /// Run until shutdown, reconnecting every 5 seconds after errors
    pub async fn start(&self) -> anyhow::Result<()> {
        if !self.config.enabled {
            tracing::info!("Redis disabled, trigger subscriber not started");
            return Ok(());
        }
        if self.config.channels.is_empty() {
            tracing::info!("No Redis channels configured, skipping trigger subscriber");
            return Ok(());
        }

        tracing::info!(channels = ?self.config.channels, "Starting Redis trigger subscriber");
        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            match self.run_subscription_loop(&self.config.channels).await {
                Ok(()) => {
                    tracing::info!("Redis trigger subscriber stopped");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Redis subscription error, reconnecting in 5 seconds");
                    tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        _ = tokio::time::sleep(Duration::from_secs(5)) => {}
                    }
                }
            }
        }

        Ok(())
    }

    async fn run_subscription_loop(&self, channels: &[String]) -> anyhow::Result<()> {
        let client = redis::Client::open(self.config.url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        for channel in channels {
            if is_pattern(channel) {
                pubsub.psubscribe(channel).await?;
                tracing::debug!(pattern = %channel, "Subscribed to pattern");
            } else {
                pubsub.subscribe(channel).await?;
                tracing::debug!(channel = %channel, "Subscribed to channel");
            }
        }

        tracing::info!("Redis subscription established");

        let mut message_stream = pubsub.on_message();
        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Received shutdown signal");
                    return Ok(());
                }
                msg = message_stream.next() => {
                    let Some(msg) = msg else {
                        anyhow::bail!("Redis message stream ended");
                    };
                    let payload: String = match msg.get_payload() {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to get message payload");
                            continue;
                        }
                    };
                    self.handle_message(msg.get_channel_name(), &payload);
                }
            }
        }
    }

    /// Each trigger is dispatched on its own task so a slow gateway never
    /// stalls the subscription.
    fn handle_message(&self, channel: &str, payload: &str) {
        tracing::debug!(channel = %channel, "Received trigger message");
        TriggerMetrics::record_redis();

        let Some(message) = parse_trigger_message(payload) else {
            return;
        };

        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            let report = dispatcher
                .dispatch(&message.trigger_id, &message.title, &message.body)
                .await;
            tracing::debug!(
                trigger_id = %message.trigger_id,
                delivered = report.delivered,
                failed = report.failed,
                "Dispatched trigger from Redis"
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_and_snake_case() {
        let camel = parse_trigger_message(r#"{"triggerId":"task.failed","title":"T","body":"B"}"#);
        let snake = parse_trigger_message(r#"{"trigger_id":"task.failed","title":"T","body":"B"}"#);
        assert_eq!(camel, snake);
        assert_eq!(camel.unwrap().trigger_id, "task.failed");
    }

    #[test]
    fn test_parse_defaults_and_rejects() {
        let message = parse_trigger_message(r#"{"triggerId":" user.login "}"#).unwrap();
        assert_eq!(message.trigger_id, "user.login");
        assert_eq!(message.title, "");

        assert!(parse_trigger_message("not json").is_none());
        assert!(parse_trigger_message(r#"{"title":"no id"}"#).is_none());
        assert!(parse_trigger_message(r#"{"triggerId":"  "}"#).is_none());
    }

    #[test]
    fn test_pattern_detection() {
        assert!(is_pattern("notification:trigger:*"));
        assert!(!is_pattern("notification:trigger"));
    }
}
