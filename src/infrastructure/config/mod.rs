mod settings;

pub use settings::{
    ApiConfig, DeliveryConfig, DispatchConfig, LoggingConfig, PolicyConfig, RedisConfig,
    ServerConfig, Settings, StoreConfig,
};
