use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::policy::PolicyGate;

/// Background task evicting idle channel entries from the policy gate
pub struct PolicyCleanupTask {
    gate: Arc<PolicyGate>,
    interval: Duration,
    shutdown: broadcast::Receiver<()>,
}

impl PolicyCleanupTask {
    pub fn new(gate: Arc<PolicyGate>, interval_secs: u64, shutdown: broadcast::Receiver<()>) -> Self {
        Self {
            gate,
            interval: Duration::from_secs(interval_secs.max(1)),
            shutdown,
        }
    }

    /// Run until the shutdown signal fires
    pub async fn run(mut self) {
        let mut cleanup_timer = tokio::time::interval(self.interval);

        // Skip immediate first tick
        cleanup_timer.tick().await;

        tracing::info!(
            cleanup_interval_secs = self.interval.as_secs(),
            "Policy cleanup task started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Policy cleanup task received shutdown signal");
                    break;
                }
                _ = cleanup_timer.tick() => {
                    let removed = self.gate.cleanup_stale();
                    if removed > 0 {
                        tracing::debug!(removed, "Evicted stale policy entries");
                    }
                }
            }
        }

        tracing::info!("Policy cleanup task stopped");
    }
}
