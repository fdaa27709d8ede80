pub mod wallet;
pub mod chain;
pub mod alert;
pub mod settings;

pub use wallet::{Allowance, AlertState, ApprovalGrant, ApprovalState, WalletRecord, WalletUpdate};
pub use chain::{Balances, Chain, Transaction};
pub use alert::{AuditOutcome, BatchReport, ExposureAlert};
pub use settings::{Settings, TokenSpec, DEFAULT_DUST_THRESHOLD};
