// Infrastructure layer (shared components)
pub mod infrastructure;

// Re-export infrastructure modules at the crate root
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;
pub use infrastructure::redis;

// Domain layer (business logic)
pub mod catalog;
pub mod delivery;
pub mod encoder;
pub mod notification;
pub mod policy;
pub mod store;

// Application layer
pub mod api;
pub mod server;
pub mod triggers;

// Supporting modules
pub mod tasks;
