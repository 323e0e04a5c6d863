use std::sync::Arc;

use crate::config::DeliveryConfig;

use super::{AppriseClient, DeliveryClient, LogDeliveryClient};

/// Create a delivery client based on configuration.
///
/// - `"log"`: dry-run client
/// - `"apprise"` (default): HTTP gateway client, log client when the HTTP
///   client cannot be built
pub fn create_delivery_client(config: &DeliveryConfig) -> Arc<dyn DeliveryClient> {
    match config.backend.as_str() {
        "log" => {
            tracing::info!(backend = "log", "Creating dry-run delivery client");
            Arc::new(LogDeliveryClient)
        }
        other => {
            if other != "apprise" {
                tracing::warn!(backend = %other, "Unknown delivery backend, using apprise");
            }
            match AppriseClient::new(&config.apprise_url, config.timeout_seconds) {
                Ok(client) => {
                    tracing::info!(
                        backend = "apprise",
                        url = %client.notify_url(),
                        timeout_seconds = config.timeout_seconds,
                        "Creating Apprise delivery client"
                    );
                    Arc::new(client)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build Apprise client, falling back to dry run");
                    Arc::new(LogDeliveryClient)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection() {
        let log = DeliveryConfig {
            backend: "log".to_string(),
            ..DeliveryConfig::default()
        };
        assert_eq!(create_delivery_client(&log).name(), "log");
        assert_eq!(create_delivery_client(&DeliveryConfig::default()).name(), "apprise");
    }
}
