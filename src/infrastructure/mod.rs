//! Infrastructure layer modules
//!
//! Shared components used by the domain and application layers:
//! - `config`: Application configuration and settings
//! - `error`: HTTP-facing error type
//! - `metrics`: Prometheus metrics helpers
//! - `redis`: Redis command pool and circuit breaker

pub mod config;
pub mod error;
pub mod metrics;
pub mod redis;
