use ethers::types::U256;
use ethers::utils::{format_units, parse_units};
use crate::utils::{MonitorError, Result};

/// Raw units to a decimal string without trailing zeros
pub fn format_amount(raw: U256, decimals: u32) -> Result<String> {
    let formatted = format_units(raw, decimals)
        .map_err(|e| MonitorError::Validation(format!("cannot format {}: {}", raw, e)))?;
    
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    Ok(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() })
}

/// Decimal token amount (e.g. "0.1") to raw units
pub fn parse_amount(amount: &str, decimals: u32) -> Result<U256> {
    if !is_decimal(amount) {
        return Err(MonitorError::Validation(format!("not a decimal amount: {}", amount)));
    }
    parse_units(amount.trim(), decimals)
        .map(U256::from)
        .map_err(|e| MonitorError::Validation(format!("invalid amount {}: {}", amount, e)))
}

/// Non-negative decimal such as `12`, `0.5` or `.5`
pub fn is_decimal(value: &str) -> bool {
    let value = value.trim();
    let mut parts = value.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let frac = parts.next();
    
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match frac {
        Some(frac) => (!whole.is_empty() || !frac.is_empty()) && digits(whole) && digits(frac),
        None => !whole.is_empty() && digits(whole),
    }
}
