use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use crate::core::AlertSink;
use crate::models::ExposureAlert;
use crate::utils::{MonitorError, Result};

/// POSTs each alert as JSON to a configured URL
pub struct WebhookSink {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct WebhookReceipt {
    id: Option<String>,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }
    
    async fn deliver(&self, alert: &ExposureAlert) -> Result<String> {
        let body = serde_json::json!({
            "message": alert.summary(),
            "alert": alert,
        });
        
        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::AlertFailed(format!("webhook returned {}", status)));
        }
        
        // The receiver may return its own id; otherwise derive one
        let receipt = response.json::<WebhookReceipt>().await.ok();
        Ok(receipt
            .and_then(|r| r.id)
            .unwrap_or_else(|| format!("webhook-{}-{}", alert.owner, alert.detected_at.timestamp_millis())))
    }
}
