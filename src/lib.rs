pub mod core;
pub mod models;
pub mod api;
pub mod alerts;
pub mod blockchain;
pub mod contracts;
pub mod indexer;
pub mod storage;
pub mod config;
pub mod utils;

pub use core::{AlertSink, AuditScheduler, ChainReader, ExposureAuditor};
pub use models::{AlertState, ApprovalState, WalletRecord, Settings, Chain};
pub use utils::{MonitorError, Result};
