use async_trait::async_trait;
use ethers::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use crate::contracts::IERC20;
use crate::core::ChainReader;
use crate::utils::{Result, MonitorError};

/// Blockchain RPC client (read-only)
pub struct BlockchainClient {
    provider: Arc<Provider<Http>>,
    chain_id: u64,
}

impl BlockchainClient {
    /// Create a new client; every RPC request is bounded by `timeout`
    pub async fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let url: reqwest::Url = rpc_url.parse()
            .map_err(|e| MonitorError::RpcError(
                ProviderError::CustomError(format!("Invalid RPC URL: {}", e))
            ))?;
        
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;
        
        let provider = Arc::new(Provider::new(Http::new_with_client(url, http_client)));
        
        // Get chain ID
        let chain_id = provider.get_chainid().await?;
        
        tracing::info!("Connected to chain ID: {}", chain_id);
        
        Ok(Self {
            provider,
            chain_id: chain_id.as_u64(),
        })
    }
    
    fn token(&self, token: Address) -> IERC20<Provider<Http>> {
        IERC20::new(token, self.provider.clone())
    }
    
    /// Token decimals as reported by the contract
    pub async fn token_decimals(&self, token: Address) -> Result<u8> {
        self.token(token).decimals().call().await
            .map_err(|e| MonitorError::Contract(format!("decimals failed: {}", e)))
    }
    
    pub async fn token_symbol(&self, token: Address) -> Result<String> {
        self.token(token).symbol().call().await
            .map_err(|e| MonitorError::Contract(format!("symbol failed: {}", e)))
    }
    
    /// Get chain ID
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
    
    /// Get chain name
    pub fn chain_name(&self) -> &'static str {
        match self.chain_id {
            1 => "Ethereum Mainnet",
            56 => "BNB Smart Chain",
            137 => "Polygon",
            43114 => "Avalanche C-Chain",
            _ => "Unknown Chain",
        }
    }
}

#[async_trait]
impl ChainReader for BlockchainClient {
    async fn block_number(&self) -> Result<u64> {
        let block = self.provider.get_block_number().await?;
        Ok(block.as_u64())
    }
    
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        tracing::debug!("balanceOf({:?}) on {:?}", owner, token);
        self.token(token).balance_of(owner).call().await
            .map_err(|e| MonitorError::Contract(format!("balanceOf failed: {}", e)))
    }
    
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        tracing::debug!("allowance({:?}, {:?}) on {:?}", owner, spender, token);
        self.token(token).allowance(owner, spender).call().await
            .map_err(|e| MonitorError::Contract(format!("allowance failed: {}", e)))
    }
}
