use async_trait::async_trait;

use super::{DeliveryClient, DeliveryError};

/// Dry-run client: logs what would be sent and always succeeds.
///
/// Only the URL count is logged since URLs embed credentials.
#[derive(Debug, Default, Clone)]
pub struct LogDeliveryClient;

#[async_trait]
impl DeliveryClient for LogDeliveryClient {
    async fn deliver(&self, urls: &[String], title: &str, body: &str) -> Result<(), DeliveryError> {
        tracing::info!(
            urls = urls.len(),
            title = %title,
            body_len = body.len(),
            "Dry-run delivery"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
