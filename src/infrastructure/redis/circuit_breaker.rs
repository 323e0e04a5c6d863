//! Circuit breaker guarding Redis commands

use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU8, Ordering};

use serde::Serialize;

use crate::metrics::RedisMetrics;

use super::current_time_ms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Half-open successes needed to close again
    pub success_threshold: u32,
    /// Time an open circuit waits before probing (ms)
    pub reset_timeout_ms: i64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout_ms: 30_000,
        }
    }
}

/// Lock-free closed / open / half-open breaker.
///
/// An open circuit rejects requests until `reset_timeout_ms` has passed,
/// then lets trial requests through; any half-open failure reopens it.
pub struct CircuitBreaker {
    state: AtomicU8,
    failures: AtomicU32,
    successes: AtomicU32,
    changed_at_ms: AtomicI64,
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: AtomicU8::new(CircuitState::Closed as u8),
            failures: AtomicU32::new(0),
            successes: AtomicU32::new(0),
            changed_at_ms: AtomicI64::new(current_time_ms()),
            config,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state_at(current_time_ms())
    }

    /// Current state, moving an expired open circuit to half-open
    pub fn state_at(&self, now_ms: i64) -> CircuitState {
        let state = CircuitState::from(self.state.load(Ordering::Acquire));
        if state != CircuitState::Open {
            return state;
        }

        let changed_at = self.changed_at_ms.load(Ordering::Acquire);
        if now_ms - changed_at < self.config.reset_timeout_ms {
            return CircuitState::Open;
        }

        if self
            .state
            .compare_exchange(
                CircuitState::Open as u8,
                CircuitState::HalfOpen as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            self.successes.store(0, Ordering::Release);
            self.changed_at_ms.store(now_ms, Ordering::Release);
            RedisMetrics::set_circuit_state(CircuitState::HalfOpen as i64);
            tracing::info!("Circuit breaker half-open, probing Redis");
        }
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    pub fn allow_request(&self) -> bool {
        self.allow_request_at(current_time_ms())
    }

    pub fn allow_request_at(&self, now_ms: i64) -> bool {
        self.state_at(now_ms) != CircuitState::Open
    }

    pub fn record_success(&self) {
        match CircuitState::from(self.state.load(Ordering::Acquire)) {
            CircuitState::Closed => self.failures.store(0, Ordering::Release),
            CircuitState::HalfOpen => {
                let successes = self.successes.fetch_add(1, Ordering::AcqRel) + 1;
                if successes >= self.config.success_threshold {
                    self.transition(CircuitState::Closed, current_time_ms());
                    tracing::info!("Circuit breaker closed after recovery");
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        self.record_failure_at(current_time_ms());
    }

    pub fn record_failure_at(&self, now_ms: i64) {
        match CircuitState::from(self.state.load(Ordering::Acquire)) {
            CircuitState::Closed => {
                let failures = self.failures.fetch_add(1, Ordering::AcqRel) + 1;
                if failures >= self.config.failure_threshold {
                    self.transition(CircuitState::Open, now_ms);
                    tracing::warn!(failures = failures, "Circuit breaker opened");
                }
            }
            CircuitState::HalfOpen => {
                self.transition(CircuitState::Open, now_ms);
                tracing::warn!("Circuit breaker reopened after failed trial request");
            }
            CircuitState::Open => self.changed_at_ms.store(now_ms, Ordering::Release),
        }
    }

    fn transition(&self, state: CircuitState, now_ms: i64) {
        self.state.store(state as u8, Ordering::Release);
        self.changed_at_ms.store(now_ms, Ordering::Release);
        self.successes.store(0, Ordering::Release);
        if state == CircuitState::Closed {
            self.failures.store(0, Ordering::Release);
        }
        RedisMetrics::set_circuit_state(state as i64);
    }
}
