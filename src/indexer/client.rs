use std::time::Duration;
use ethers::types::U256;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use crate::models::{Balances, Chain, TokenSpec, Transaction};
use crate::utils::{format_amount, normalize_address, parse_tx_hash, MonitorError, Result};

const NATIVE_DECIMALS: u32 = 18;

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub base_url: String,
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after a 429 before giving up
    pub max_retries: u32,
    /// First backoff delay, doubled on each retry
    pub backoff: Duration,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://deep-index.moralis.io/api/v2.2".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Read-only client for the indexer REST API.
/// 
/// Every call is a fresh fetch. 404/401/429 become `NotFound`,
/// `Unauthorized` and `RateLimited`; only 429 is retried.
pub struct IndexerClient {
    client: Client,
    config: IndexerConfig,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    hash: Option<String>,
    block_number: Option<String>,
    block_timestamp: Option<String>,
    from_address: Option<String>,
    to_address: Option<String>,
    value: Option<String>,
    gas: Option<String>,
    gas_price: Option<String>,
    transaction_index: Option<String>,
    nonce: Option<String>,
    input: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReceipt {
    gas_used: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNativeBalance {
    #[serde(default)]
    balance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTokenBalance {
    #[serde(default)]
    balance: Option<String>,
}

impl IndexerClient {
    pub fn new(config: IndexerConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|_| MonitorError::Validation("API key is not a valid header value".to_string()))?;
        headers.insert("x-api-key", api_key);
        
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        
        Ok(Self { client, config })
    }
    
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }
    
    /// Look up a transaction by hash
    pub async fn get_transaction(&self, hash: &str, chain: Chain) -> Result<Transaction> {
        let hash = parse_tx_hash(hash)?;
        let hash = format!("{:?}", hash);
        
        tracing::debug!("Fetching transaction {} on {}", hash, chain.name());
        
        let url = format!("{}/transaction/{}", self.config.base_url, hash);
        let raw: RawTransaction = self
            .get_json(&url, &[("chain", chain.indexer_id())])
            .await?;
        
        let tx_hash = match raw.hash {
            Some(h) if !h.is_empty() => h,
            _ => {
                return Err(MonitorError::Upstream {
                    status: 200,
                    message: "transaction payload has no hash".to_string(),
                })
            }
        };
        
        // The verbose receipt only adds gas_used/status; its absence is not fatal
        let receipt = self.get_receipt(&hash, chain).await;
        
        Ok(Transaction {
            hash: tx_hash,
            block_number: raw.block_number,
            block_timestamp: raw.block_timestamp,
            from_address: raw.from_address,
            to_address: raw.to_address,
            value: raw.value,
            gas_used: receipt
                .as_ref()
                .and_then(|r| r.gas_used.clone())
                .or_else(|| raw.gas.clone()),
            gas: raw.gas,
            gas_price: raw.gas_price,
            status: receipt
                .and_then(|r| r.status)
                .unwrap_or_else(|| "1".to_string()),
            transaction_index: raw.transaction_index,
            nonce: raw.nonce,
            input: raw.input,
            network: chain,
            chain_id: chain.indexer_id().to_string(),
        })
    }
    
    async fn get_receipt(&self, hash: &str, chain: Chain) -> Option<RawReceipt> {
        let url = format!("{}/transaction/{}/verbose", self.config.base_url, hash);
        let response = self
            .client
            .get(&url)
            .query(&[("chain", chain.indexer_id())])
            .send()
            .await
            .ok()?;
        
        if !response.status().is_success() {
            tracing::debug!("Receipt lookup for {} returned {}", hash, response.status());
            return None;
        }
        response.json().await.ok()
    }
    
    /// Native and token balances of `address`, formatted in whole units
    pub async fn get_balances(
        &self,
        address: &str,
        chain: Chain,
        token: &TokenSpec,
    ) -> Result<Balances> {
        let address = normalize_address(address)?;
        let token_address = normalize_address(&token.address)?;
        
        tracing::debug!("Fetching balances for {} on {}", address, chain.name());
        
        let native_url = format!("{}/{}/balance", self.config.base_url, address);
        let native: RawNativeBalance = self
            .get_json(&native_url, &[("chain", chain.indexer_id())])
            .await?;
        
        let token_url = format!("{}/{}/erc20", self.config.base_url, address);
        let tokens: Vec<RawTokenBalance> = self
            .get_json(
                &token_url,
                &[
                    ("chain", chain.indexer_id()),
                    ("token_addresses", token_address.as_str()),
                ],
            )
            .await?;
        
        let native_raw = parse_raw(native.balance.as_deref())?;
        let token_raw = parse_raw(tokens.first().and_then(|t| t.balance.as_deref()))?;
        
        Ok(Balances {
            address,
            native: format_amount(native_raw, NATIVE_DECIMALS)?,
            token: format_amount(token_raw, token.decimals)?,
        })
    }
    
    /// GET with status mapping and bounded 429 retries
    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut attempt = 0u32;
        
        loop {
            attempt += 1;
            let response = self.client.get(url).query(query).send().await?;
            let status = response.status();
            
            if status.is_success() {
                return Ok(response.json::<T>().await?);
            }
            
            match status {
                StatusCode::NOT_FOUND => {
                    return Err(MonitorError::NotFound(url.to_string()));
                }
                StatusCode::UNAUTHORIZED => {
                    tracing::error!("Indexer rejected the API key");
                    return Err(MonitorError::Unauthorized);
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    if attempt > self.config.max_retries {
                        tracing::warn!("Rate limited on {} after {} attempt(s)", url, attempt);
                        return Err(MonitorError::RateLimited { attempts: attempt });
                    }
                    let delay = self.config.backoff * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!("Rate limited on {}, retrying in {:?}", url, delay);
                    tokio::time::sleep(delay).await;
                }
                _ => {
                    let message = response.text().await.unwrap_or_default();
                    return Err(MonitorError::Upstream {
                        status: status.as_u16(),
                        message,
                    });
                }
            }
        }
    }
}

fn parse_raw(value: Option<&str>) -> Result<U256> {
    match value {
        None | Some("") => Ok(U256::zero()),
        Some(v) => U256::from_dec_str(v).map_err(|_| MonitorError::Upstream {
            status: 200,
            message: format!("unparseable balance: {}", v),
        }),
    }
}
