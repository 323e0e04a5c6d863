//! Lazily connected Redis command connection.
//!
//! The Pub/Sub subscriber uses its own dedicated connection; this pool
//! serves plain commands such as the settings store's GET and SET.

use std::sync::Arc;

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, RedisResult};
use tokio::sync::RwLock;

use crate::metrics::RedisMetrics;

use super::{CircuitBreaker, CircuitState};

/// Error type for Redis pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Circuit breaker is open")]
    CircuitOpen,
}

/// Shared multiplexed connection with circuit breaker protection.
pub struct RedisPool {
    client: Client,
    connection: RwLock<Option<MultiplexedConnection>>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl RedisPool {
    /// Create a pool; no connection is made until the first command.
    pub fn new(url: &str, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, PoolError> {
        let client = Client::open(url)?;

        Ok(Self {
            client,
            connection: RwLock::new(None),
            circuit_breaker,
        })
    }

    pub async fn get_connection(&self) -> Result<MultiplexedConnection, PoolError> {
        if !self.circuit_breaker.allow_request() {
            return Err(PoolError::CircuitOpen);
        }

        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                return Ok(c.clone());
            }
        }

        self.connect().await
    }

    async fn connect(&self) -> Result<MultiplexedConnection, PoolError> {
        let mut conn_guard = self.connection.write().await;

        // Another task may have connected while we waited for the lock
        if let Some(ref c) = *conn_guard {
            return Ok(c.clone());
        }

        RedisMetrics::record_reconnection();
        match self.client.get_multiplexed_tokio_connection().await {
            Ok(conn) => {
                *conn_guard = Some(conn.clone());
                self.circuit_breaker.record_success();
                RedisMetrics::set_connected(true);
                tracing::info!("Redis pool connection established");
                Ok(conn)
            }
            Err(e) => {
                self.circuit_breaker.record_failure();
                RedisMetrics::set_connected(false);
                tracing::error!(error = %e, "Failed to connect to Redis");
                Err(PoolError::Redis(e))
            }
        }
    }

    /// Run a command, recording the outcome on the circuit breaker and
    /// dropping the cached connection when it broke.
    pub async fn execute<F, T, Fut>(&self, f: F) -> Result<T, PoolError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: std::future::Future<Output = RedisResult<T>>,
    {
        let conn = self.get_connection().await?;

        match f(conn).await {
            Ok(result) => {
                self.circuit_breaker.record_success();
                Ok(result)
            }
            Err(e) => {
                if e.is_connection_dropped() || e.is_io_error() {
                    *self.connection.write().await = None;
                    RedisMetrics::set_connected(false);
                }
                self.circuit_breaker.record_failure();
                Err(PoolError::Redis(e))
            }
        }
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>, PoolError> {
        let key = key.to_string();
        self.execute(|mut conn| async move { conn.get(key).await })
            .await
    }

    pub async fn set_string(&self, key: &str, value: String) -> Result<(), PoolError> {
        let key = key.to_string();
        self.execute(|mut conn| async move { conn.set::<_, _, ()>(key, value).await })
            .await
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }
}
