use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{DeliveryClient, DeliveryError};

/// Request body of the gateway's `/notify/` endpoint
#[derive(Debug, Serialize)]
pub struct NotifyPayload<'a> {
    pub urls: &'a [String],
    pub title: &'a str,
    pub body: &'a str,
}

/// Client for an Apprise API server
#[derive(Debug, Clone)]
pub struct AppriseClient {
    client: Client,
    notify_url: String,
}

impl AppriseClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            notify_url: notify_endpoint(base_url),
        })
    }

    pub fn notify_url(&self) -> &str {
        &self.notify_url
    }
}

fn notify_endpoint(base_url: &str) -> String {
    format!("{}/notify/", base_url.trim_end_matches('/'))
}

#[async_trait]
impl DeliveryClient for AppriseClient {
    async fn deliver(&self, urls: &[String], title: &str, body: &str) -> Result<(), DeliveryError> {
        if urls.is_empty() {
            return Err(DeliveryError::NoUrls);
        }

        let payload = NotifyPayload { urls, title, body };
        let response = self
            .client
            .post(&self.notify_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(urls = urls.len(), title = %title, "Apprise notification sent");
            Ok(())
        } else {
            tracing::warn!(status = %status, "Apprise returned non-success status");
            Err(DeliveryError::Status {
                status: status.as_u16(),
            })
        }
    }

    fn name(&self) -> &'static str {
        "apprise"
    }
}
