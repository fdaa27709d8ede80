use serde::{Deserialize, Serialize};

/// Networks the indexer is queried on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    #[default]
    Bsc,
    Ethereum,
    Polygon,
    Avalanche,
}

impl Chain {
    /// Unknown names fall back to BSC
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "bsc" => Chain::Bsc,
            "ethereum" | "eth" => Chain::Ethereum,
            "polygon" => Chain::Polygon,
            "avalanche" => Chain::Avalanche,
            other => {
                tracing::warn!("⚠️ Unsupported network: {}, defaulting to BSC", other);
                Chain::Bsc
            }
        }
    }
    
    /// Hex chain id as the indexer expects it
    pub fn indexer_id(&self) -> &'static str {
        match self {
            Chain::Bsc => "0x38",
            Chain::Ethereum => "0x1",
            Chain::Polygon => "0x89",
            Chain::Avalanche => "0xa86a",
        }
    }
    
    pub fn name(&self) -> &'static str {
        match self {
            Chain::Bsc => "bsc",
            Chain::Ethereum => "ethereum",
            Chain::Polygon => "polygon",
            Chain::Avalanche => "avalanche",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub block_number: Option<String>,
    pub block_timestamp: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub value: Option<String>,
    pub gas: Option<String>,
    pub gas_price: Option<String>,
    pub gas_used: Option<String>,
    pub status: String,
    pub transaction_index: Option<String>,
    pub nonce: Option<String>,
    pub input: Option<String>,
    pub network: Chain,
    pub chain_id: String,
}

/// Formatted balances for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    pub address: String,
    pub native: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_chain_ids() {
        assert_eq!(Chain::from_name("bsc").indexer_id(), "0x38");
        assert_eq!(Chain::from_name("Ethereum").indexer_id(), "0x1");
        assert_eq!(Chain::from_name("polygon").indexer_id(), "0x89");
        assert_eq!(Chain::from_name("avalanche").indexer_id(), "0xa86a");
    }
    
    #[test]
    fn test_unknown_chain_defaults_to_bsc() {
        assert_eq!(Chain::from_name("solana"), Chain::Bsc);
    }
}
