//! Contract bindings used for read-only chain queries
pub mod erc20;

pub use erc20::IERC20;
