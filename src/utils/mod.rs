pub mod errors;
pub mod validation;
pub mod units;

pub use errors::{MonitorError, Result};
pub use validation::{
    format_address, is_valid_address, is_valid_tx_hash, normalize_address, parse_address,
    parse_tx_hash,
};
pub use units::{format_amount, is_decimal, parse_amount};
