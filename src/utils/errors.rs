use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    
    #[error("Invalid transaction hash: {0}")]
    InvalidTxHash(String),
    
    #[error("Invalid request: {0}")]
    Validation(String),
    
    #[error("Not found: {0}")]
    NotFound(String),
    
    #[error("Indexer rejected the API key")]
    Unauthorized,
    
    #[error("Rate limited by upstream after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },
    
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },
    
    #[error("Chain unavailable: {0}")]
    ChainUnavailable(String),
    
    #[error("An audit batch is already running")]
    BatchInProgress,
    
    #[error("Wallet {0} was already alerted")]
    AlreadyAlerted(String),
    
    #[error("Alert delivery failed: {0}")]
    AlertFailed(String),
    
    #[error("Contract call failed: {0}")]
    Contract(String),
    
    #[error("Storage error: {0}")]
    Storage(String),
    
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    
    #[error("RPC error: {0}")]
    RpcError(#[from] ethers::providers::ProviderError),
    
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MonitorError {
    /// Input problems detected before any network or state effect
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MonitorError::InvalidAddress(_) | MonitorError::InvalidTxHash(_) | MonitorError::Validation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
