use async_trait::async_trait;
use crate::core::AlertSink;
use crate::models::ExposureAlert;
use crate::utils::Result;

/// Emits alerts as structured log events
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }
    
    async fn deliver(&self, alert: &ExposureAlert) -> Result<String> {
        tracing::warn!(
            owner = %alert.owner,
            spender = %alert.spender,
            token = %alert.token,
            balance = %alert.balance,
            unlimited = alert.unlimited,
            "{}",
            alert.summary()
        );
        Ok(format!("log-{}-{}", alert.owner, alert.detected_at.timestamp_millis()))
    }
}
