//! Redis connectivity: circuit breaker and command pool.

mod circuit_breaker;
pub mod pool;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use pool::{PoolError, RedisPool};

/// Get current time in milliseconds since epoch
pub(crate) fn current_time_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
