//! Per-channel delivery gate

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use crate::notification::NotificationPolicy;

use super::token_bucket::TokenBucket;

/// Outcome of a policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PolicyDecision {
    Allow,
    Cooldown { retry_after_secs: u64 },
    Duplicate,
    RateLimited { retry_after_secs: u64 },
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyDecision::Allow)
    }

    /// Metric label for a suppression
    pub fn reason(&self) -> &'static str {
        match self {
            PolicyDecision::Allow => "allow",
            PolicyDecision::Cooldown { .. } => "cooldown",
            PolicyDecision::Duplicate => "duplicate",
            PolicyDecision::RateLimited { .. } => "rate_limited",
        }
    }
}

/// Identity of a notification for duplicate suppression
pub fn fingerprint(trigger_id: &str, title: &str, body: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    trigger_id.hash(&mut hasher);
    title.hash(&mut hasher);
    body.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
struct ChannelState {
    last_delivery_ms: Option<i64>,
    recent: HashMap<u64, i64>,
    bucket: Option<TokenBucket>,
    last_seen_ms: i64,
    /// End of the latest cooldown, dedup or refill window
    hold_until_ms: i64,
}

impl ChannelState {
    fn new(now_ms: i64) -> Self {
        Self {
            last_delivery_ms: None,
            recent: HashMap::new(),
            bucket: None,
            last_seen_ms: now_ms,
            hold_until_ms: now_ms,
        }
    }
}

/// Gate configuration
#[derive(Debug, Clone)]
pub struct PolicyGateConfig {
    /// Idle time after which a channel's state is dropped
    pub entry_ttl_seconds: u64,
}

impl Default for PolicyGateConfig {
    fn default() -> Self {
        Self {
            entry_ttl_seconds: 3600,
        }
    }
}

/// Enforces [`NotificationPolicy`] limits per channel id.
///
/// Checks run in order cooldown, duplicate, rate; a suppressed delivery
/// never consumes a rate token or refreshes the cooldown.
pub struct PolicyGate {
    channels: DashMap<String, ChannelState>,
    config: PolicyGateConfig,
    allowed: AtomicU64,
    suppressed: AtomicU64,
}

impl PolicyGate {
    pub fn new(config: PolicyGateConfig) -> Self {
        Self {
            channels: DashMap::new(),
            config,
            allowed: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
        }
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Check and, when allowed, record a delivery
    pub fn check(
        &self,
        channel_id: &str,
        policy: &NotificationPolicy,
        fingerprint: u64,
    ) -> PolicyDecision {
        self.check_at(channel_id, policy, fingerprint, Self::now_ms())
    }

    pub fn check_at(
        &self,
        channel_id: &str,
        policy: &NotificationPolicy,
        fingerprint: u64,
        now_ms: i64,
    ) -> PolicyDecision {
        if policy.is_unrestricted() {
            self.allowed.fetch_add(1, Ordering::Relaxed);
            return PolicyDecision::Allow;
        }

        let mut state = self
            .channels
            .entry(channel_id.to_string())
            .or_insert_with(|| ChannelState::new(now_ms));
        state.last_seen_ms = now_ms;

        let decision = Self::evaluate(&mut state, policy, fingerprint, now_ms);
        drop(state);

        if decision.is_allowed() {
            self.allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
        }
        decision
    }

    fn evaluate(
        state: &mut ChannelState,
        policy: &NotificationPolicy,
        fingerprint: u64,
        now_ms: i64,
    ) -> PolicyDecision {
        let dedup_ms = policy.dedup_window_seconds as i64 * 1000;
        state.recent.retain(|_, sent_at| now_ms - *sent_at < dedup_ms);

        if policy.cooldown_seconds > 0 {
            let cooldown_ms = policy.cooldown_seconds as i64 * 1000;
            if let Some(last) = state.last_delivery_ms {
                let elapsed = now_ms - last;
                if elapsed < cooldown_ms {
                    let remaining = (cooldown_ms - elapsed) as u64;
                    return PolicyDecision::Cooldown {
                        retry_after_secs: remaining.div_ceil(1000),
                    };
                }
            }
        }

        if dedup_ms > 0 && state.recent.contains_key(&fingerprint) {
            return PolicyDecision::Duplicate;
        }

        if policy.max_per_minute > 0 {
            let bucket = state
                .bucket
                .get_or_insert_with(|| TokenBucket::new(policy.max_per_minute, now_ms));
            if bucket.capacity() != policy.max_per_minute {
                bucket.set_capacity(policy.max_per_minute);
            }
            if !bucket.try_consume_at(now_ms) {
                return PolicyDecision::RateLimited {
                    retry_after_secs: bucket.retry_after_ms(now_ms).div_ceil(1000).max(1),
                };
            }
        } else {
            state.bucket = None;
        }

        state.last_delivery_ms = Some(now_ms);
        if dedup_ms > 0 {
            state.recent.insert(fingerprint, now_ms);
        }

        let cooldown_ms = policy.cooldown_seconds as i64 * 1000;
        let refill_ms = if state.bucket.is_some() { 60_000 } else { 0 };
        let window_end = now_ms + cooldown_ms.max(dedup_ms).max(refill_ms);
        state.hold_until_ms = state.hold_until_ms.max(window_end);
        PolicyDecision::Allow
    }

    /// Drop channels idle for longer than the configured TTL whose
    /// cooldown, dedup and refill windows have all run out
    pub fn cleanup_stale(&self) -> usize {
        self.cleanup_stale_at(Self::now_ms())
    }

    pub fn cleanup_stale_at(&self, now_ms: i64) -> usize {
        let ttl_ms = (self.config.entry_ttl_seconds * 1000) as i64;
        let mut removed = 0;

        self.channels.retain(|_, state| {
            let idle = now_ms - state.last_seen_ms >= ttl_ms;
            if idle && now_ms >= state.hold_until_ms {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            tracing::debug!(
                removed = removed,
                tracked_channels = self.channels.len(),
                "Cleaned up stale policy entries"
            );
        }

        removed
    }

    pub fn stats(&self) -> PolicyGateStats {
        PolicyGateStats {
            tracked_channels: self.channels.len(),
            allowed: self.allowed.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            entry_ttl_seconds: self.config.entry_ttl_seconds,
        }
    }
}

/// Statistics about the policy gate
#[derive(Debug, Clone, Serialize)]
pub struct PolicyGateStats {
    pub tracked_channels: usize,
    pub allowed: u64,
    pub suppressed: u64,
    pub entry_ttl_seconds: u64,
}
