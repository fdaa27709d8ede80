use std::path::PathBuf;
use std::time::Duration;
use clap::Parser;
use crate::core::AuditConfig;
use crate::indexer::IndexerConfig;
use crate::models::{Chain, Settings};

/// Read-only ERC-20 approval exposure monitor
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP API listens on
    #[arg(long, env = "MONITOR_BIND", default_value = "0.0.0.0:5000")]
    pub bind: String,
    
    /// Directory holding wallets.json and settings.json
    #[arg(long, env = "MONITOR_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
    
    /// Chain indexer REST base URL
    #[arg(long, env = "INDEXER_URL", default_value = "https://deep-index.moralis.io/api/v2.2")]
    pub indexer_url: String,
    
    #[arg(long, env = "INDEXER_API_KEY", hide_env_values = true)]
    pub indexer_api_key: String,
    
    /// JSON-RPC endpoint used for balance and allowance reads
    #[arg(long, env = "RPC_URL", default_value = "https://bsc-dataseed.binance.org/")]
    pub rpc_url: String,
    
    /// ERC-20 token to monitor (used until settings.json overrides it)
    #[arg(long, env = "TOKEN_ADDRESS", default_value = "0x55d398326f99059fF775485246999027B3197955")]
    pub token: String,
    
    #[arg(long, env = "TOKEN_DECIMALS", default_value_t = 18)]
    pub token_decimals: u32,
    
    #[arg(long, env = "CHAIN", default_value = "bsc")]
    pub chain: String,
    
    /// Timeout for every outbound HTTP/RPC request
    #[arg(long, default_value_t = 10)]
    pub request_timeout_secs: u64,
    
    /// Retries after an indexer 429
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,
    
    /// Seconds between scheduled audits; 0 disables the scheduler
    #[arg(long, env = "AUDIT_INTERVAL_SECS", default_value_t = 300)]
    pub audit_interval_secs: u64,
    
    /// Pause between wallets within one audit batch
    #[arg(long, default_value_t = 1000)]
    pub batch_delay_ms: u64,
    
    /// Deliver alerts to this URL instead of the log
    #[arg(long, env = "ALERT_WEBHOOK_URL")]
    pub webhook_url: Option<String>,
    
    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
    
    pub fn indexer(&self) -> IndexerConfig {
        IndexerConfig {
            base_url: self.indexer_url.trim_end_matches('/').to_string(),
            api_key: self.indexer_api_key.clone(),
            timeout: self.request_timeout(),
            max_retries: self.max_retries,
            ..IndexerConfig::default()
        }
    }
    
    pub fn audit(&self) -> AuditConfig {
        AuditConfig {
            batch_delay: Duration::from_millis(self.batch_delay_ms),
        }
    }
    
    pub fn audit_interval(&self) -> Option<Duration> {
        (self.audit_interval_secs > 0).then(|| Duration::from_secs(self.audit_interval_secs))
    }
    
    pub fn default_settings(&self) -> Settings {
        Settings::new(self.token.to_lowercase(), self.token_decimals, Chain::from_name(&self.chain))
    }
    
    pub fn wallets_path(&self) -> PathBuf {
        self.data_dir.join("wallets.json")
    }
    
    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }
}
