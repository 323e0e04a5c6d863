//! Delivery collaborators.
//!
//! A [`DeliveryClient`] takes the encoded service URLs of one channel and
//! hands title and body to the gateway in a single call.
//!
//! - `AppriseClient`: Apprise-compatible HTTP gateway
//! - `LogDeliveryClient`: dry run that only logs

mod apprise;
mod dry_run;
mod factory;

use async_trait::async_trait;
use thiserror::Error;

pub use apprise::AppriseClient;
pub use dry_run::LogDeliveryClient;
pub use factory::create_delivery_client;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned status {status}")]
    Status { status: u16 },

    #[error("No service URLs to deliver to")]
    NoUrls,
}

#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Deliver one notification to every URL in a single gateway call
    async fn deliver(&self, urls: &[String], title: &str, body: &str) -> Result<(), DeliveryError>;

    /// Client name for logging
    fn name(&self) -> &'static str;
}
