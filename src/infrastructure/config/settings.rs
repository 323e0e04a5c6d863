use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Required `X-API-Key` value for `/api/v1`; unset disables the check
    pub key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Enables the trigger subscriber and the Redis settings store
    #[serde(default)]
    pub enabled: bool,
    /// Pub/Sub channels carrying trigger messages; glob patterns allowed
    #[serde(default = "default_redis_channels")]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// `memory`, `file` or `redis`
    #[serde(default = "default_store_backend")]
    pub backend: String,
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default = "default_store_redis_key")]
    pub redis_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// `apprise` or `log`
    #[serde(default = "default_delivery_backend")]
    pub backend: String,
    #[serde(default = "default_apprise_url")]
    pub apprise_url: String,
    #[serde(default = "default_delivery_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cleanup task interval in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
    /// Idle time before a channel's policy state is dropped
    #[serde(default = "default_entry_ttl")]
    pub entry_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_deliveries: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_channels() -> Vec<String> {
    vec!["notification:trigger".to_string()]
}

fn default_store_backend() -> String {
    "memory".to_string()
}

fn default_store_path() -> String {
    "data/notification-settings.json".to_string()
}

fn default_store_redis_key() -> String {
    "notification:settings".to_string()
}

fn default_delivery_backend() -> String {
    "apprise".to_string()
}

fn default_apprise_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_delivery_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_cleanup_interval() -> u64 {
    60 // 1 minute
}

fn default_entry_ttl() -> u64 {
    3600 // 1 hour
}

fn default_max_concurrent() -> usize {
    16
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("store.backend", "memory")?
            .set_default("delivery.backend", "apprise")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // DISPATCH_SERVER__PORT, DISPATCH_DELIVERY__APPRISE_URL, DISPATCH_REDIS__CHANNELS=a,b
            .add_source(
                Environment::with_prefix("DISPATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("redis.channels"),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            enabled: false,
            channels: default_redis_channels(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
            redis_key: default_store_redis_key(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            backend: default_delivery_backend(),
            apprise_url: default_apprise_url(),
            timeout_seconds: default_delivery_timeout(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cleanup_interval_seconds: default_cleanup_interval(),
            entry_ttl_seconds: default_entry_ttl(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_deliveries: default_max_concurrent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}
