//! Shape checks for addresses and transaction hashes.
//! 
//! These run before any store mutation or network call.

use ethers::types::{Address, H256};
use crate::utils::{MonitorError, Result};

fn is_hex_body(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `0x` followed by exactly 40 hex digits
pub fn is_valid_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .map(|body| is_hex_body(body, 40))
        .unwrap_or(false)
}

/// `0x` followed by exactly 64 hex digits (66 chars total)
pub fn is_valid_tx_hash(hash: &str) -> bool {
    hash.strip_prefix("0x")
        .map(|body| is_hex_body(body, 64))
        .unwrap_or(false)
}

/// Validate and normalize an address to its lowercase storage key
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if !is_valid_address(trimmed) {
        return Err(MonitorError::InvalidAddress(address.to_string()));
    }
    Ok(trimmed.to_lowercase())
}

pub fn parse_address(address: &str) -> Result<Address> {
    let key = normalize_address(address)?;
    key.parse()
        .map_err(|_| MonitorError::InvalidAddress(address.to_string()))
}

pub fn parse_tx_hash(hash: &str) -> Result<H256> {
    let trimmed = hash.trim();
    if !is_valid_tx_hash(trimmed) {
        return Err(MonitorError::InvalidTxHash(hash.to_string()));
    }
    let bytes = hex::decode(&trimmed[2..])
        .map_err(|_| MonitorError::InvalidTxHash(hash.to_string()))?;
    Ok(H256::from_slice(&bytes))
}

/// Full lowercase hex form (ethers' Display abbreviates)
pub fn format_address(address: &Address) -> String {
    format!("{:?}", address)
}
