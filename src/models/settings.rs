use serde::{Deserialize, Serialize};
use super::Chain;

pub const DEFAULT_DUST_THRESHOLD: &str = "0.1";

/// Persisted monitor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// ERC-20 contract whose allowances are audited
    pub token_address: String,
    pub token_decimals: u32,
    pub chain: Chain,
    /// Balances at or below this many whole tokens are not worth alerting on
    pub dust_threshold: String,
}

/// Token as the indexer and the chain reader need it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub address: String,
    pub decimals: u32,
}

impl Settings {
    pub fn new(token_address: impl Into<String>, token_decimals: u32, chain: Chain) -> Self {
        Self {
            token_address: token_address.into(),
            token_decimals,
            chain,
            dust_threshold: DEFAULT_DUST_THRESHOLD.to_string(),
        }
    }
    
    pub fn token(&self) -> TokenSpec {
        TokenSpec {
            address: self.token_address.clone(),
            decimals: self.token_decimals,
        }
    }
}
