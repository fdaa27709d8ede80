//! In-process chain and sink doubles for auditor tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use ethers::types::{Address, U256};
use super::{AlertSink, AuditConfig, ChainReader, ExposureAuditor};
use crate::models::{Allowance, ApprovalGrant, Chain, ExposureAlert, Settings, WalletUpdate};
use crate::storage::{LedgerStore, MemoryStore, SettingsStore};
use crate::utils::{parse_address, MonitorError, Result};

pub const TOKEN: &str = "0x55d398326f99059ff775485246999027b3197955";
pub const SPENDER: &str = "0x1111111111111111111111111111111111111111";
pub const OWNER_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const OWNER_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Thousandths of a whole 18-decimal token
pub fn tokens(milli: u64) -> U256 {
    U256::from(milli) * U256::exp10(15)
}

#[derive(Default)]
pub struct MockChain {
    balances: HashMap<Address, U256>,
    allowances: HashMap<Address, U256>,
    pub offline: AtomicBool,
    pub allowance_reads: AtomicUsize,
}

impl MockChain {
    pub fn with(mut self, owner: &str, balance: U256, allowance: U256) -> Self {
        let owner = parse_address(owner).unwrap();
        self.balances.insert(owner, balance);
        self.allowances.insert(owner, allowance);
        self
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn block_number(&self) -> Result<u64> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(MonitorError::Contract("connection refused".into()));
        }
        Ok(100)
    }
    
    async fn token_balance(&self, _token: Address, owner: Address) -> Result<U256> {
        Ok(self.balances.get(&owner).copied().unwrap_or_default())
    }
    
    async fn allowance(&self, _token: Address, owner: Address, _spender: Address) -> Result<U256> {
        self.allowance_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.allowances.get(&owner).copied().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct CountingSink {
    pub delivered: AtomicUsize,
    pub failing: AtomicBool,
    /// Extra time spent in each delivery
    pub latency_ms: u64,
}

#[async_trait]
impl AlertSink for CountingSink {
    fn name(&self) -> &'static str {
        "counting"
    }
    
    async fn deliver(&self, alert: &ExposureAlert) -> Result<String> {
        // widen the window for interleaving runs
        tokio::time::sleep(Duration::from_millis(5 + self.latency_ms)).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(MonitorError::AlertFailed("sink down".into()));
        }
        let n = self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(format!("alert-{}-{}", alert.owner, n))
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub chain: Arc<MockChain>,
    pub sink: Arc<CountingSink>,
    pub auditor: Arc<ExposureAuditor>,
}

pub fn fixture(chain: MockChain) -> Fixture {
    fixture_with_sink(chain, CountingSink::default())
}

pub fn fixture_with_sink(chain: MockChain, sink: CountingSink) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let settings = Arc::new(SettingsStore::in_memory(Settings::new(TOKEN, 18, Chain::Bsc)));
    let chain = Arc::new(chain);
    let sink = Arc::new(sink);
    let auditor = Arc::new(ExposureAuditor::new(
        store.clone(),
        settings,
        chain.clone(),
        sink.clone(),
        AuditConfig { batch_delay: Duration::ZERO },
    ));
    Fixture { store, chain, sink, auditor }
}

pub fn approve(store: &dyn LedgerStore, owner: &str) {
    store
        .upsert(
            owner,
            WalletUpdate::approval(ApprovalGrant {
                spender: SPENDER.to_string(),
                amount: Allowance::Unlimited,
                tx_hash: Some(format!("0x{}", "cd".repeat(32))),
                confirmed: true,
            }),
        )
        .unwrap();
}
