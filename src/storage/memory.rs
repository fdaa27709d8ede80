use std::sync::RwLock;
use crate::models::{WalletRecord, WalletUpdate};
use crate::utils::{MonitorError, Result};
use super::{key_for, update_in, upsert_in, Ledger, LedgerStore};

#[derive(Default)]
pub struct MemoryStore {
    ledger: RwLock<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
    
    fn poisoned() -> MonitorError {
        MonitorError::Storage("ledger lock poisoned".to_string())
    }
}

impl LedgerStore for MemoryStore {
    fn upsert(&self, address: &str, update: WalletUpdate) -> Result<WalletRecord> {
        let key = key_for(address)?;
        let mut ledger = self.ledger.write().map_err(|_| Self::poisoned())?;
        Ok(upsert_in(&mut ledger, key, update))
    }
    
    fn get(&self, address: &str) -> Result<Option<WalletRecord>> {
        let key = key_for(address)?;
        let ledger = self.ledger.read().map_err(|_| Self::poisoned())?;
        Ok(ledger.get(&key).cloned())
    }
    
    fn list(&self) -> Result<Vec<WalletRecord>> {
        let ledger = self.ledger.read().map_err(|_| Self::poisoned())?;
        Ok(ledger.values().cloned().collect())
    }
    
    fn remove(&self, address: &str) -> Result<bool> {
        let key = key_for(address)?;
        let mut ledger = self.ledger.write().map_err(|_| Self::poisoned())?;
        Ok(ledger.remove(&key).is_some())
    }
    
    fn clear(&self) -> Result<usize> {
        let mut ledger = self.ledger.write().map_err(|_| Self::poisoned())?;
        let count = ledger.len();
        ledger.clear();
        Ok(count)
    }
    
    fn update(
        &self,
        address: &str,
        f: &mut dyn FnMut(&mut WalletRecord) -> bool,
    ) -> Result<Option<WalletRecord>> {
        let key = key_for(address)?;
        let mut ledger = self.ledger.write().map_err(|_| Self::poisoned())?;
        Ok(update_in(&mut ledger, &key, f).0)
    }
}
