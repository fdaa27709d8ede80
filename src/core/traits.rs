use async_trait::async_trait;
use ethers::types::{Address, U256};
use crate::models::ExposureAlert;
use crate::utils::Result;

/// Read-only view of token state on chain
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current head; also serves as a liveness check
    async fn block_number(&self) -> Result<u64>;
    
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256>;
    
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;
}

/// Destination for exposure alerts
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Unique identifier for this sink
    fn name(&self) -> &'static str;
    
    /// Deliver the alert, returning an id for the delivery
    async fn deliver(&self, alert: &ExposureAlert) -> Result<String>;
}
