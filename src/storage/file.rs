use std::path::{Path, PathBuf};
use std::sync::Mutex;
use crate::models::{WalletRecord, WalletUpdate};
use crate::utils::{MonitorError, Result};
use super::{key_for, update_in, upsert_in, write_atomic, Ledger, LedgerStore};

/// Ledger persisted as a JSON array of records.
/// 
/// Each mutation works on a copy, writes it out, and only then swaps it in,
/// so a failed write leaves both the file and the in-memory view unchanged.
pub struct FileStore {
    path: PathBuf,
    ledger: Mutex<Ledger>,
}

impl FileStore {
    /// Load `path`, treating a missing file as an empty ledger
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        
        let ledger = if path.exists() {
            let bytes = std::fs::read(&path)?;
            let records: Vec<WalletRecord> = serde_json::from_slice(&bytes)?;
            records
                .into_iter()
                .map(|r| (r.address.to_lowercase(), r))
                .collect()
        } else {
            Ledger::new()
        };
        
        tracing::info!("📂 Loaded {} wallet record(s) from {}", ledger.len(), path.display());
        
        Ok(Self {
            path,
            ledger: Mutex::new(ledger),
        })
    }
    
    pub fn path(&self) -> &Path {
        &self.path
    }
    
    fn persist(&self, ledger: &Ledger) -> Result<()> {
        let records: Vec<&WalletRecord> = ledger.values().collect();
        let bytes = serde_json::to_vec_pretty(&records)?;
        write_atomic(&self.path, &bytes)
    }
    
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Ledger>> {
        self.ledger
            .lock()
            .map_err(|_| MonitorError::Storage("ledger lock poisoned".to_string()))
    }
}

impl LedgerStore for FileStore {
    fn upsert(&self, address: &str, update: WalletUpdate) -> Result<WalletRecord> {
        let key = key_for(address)?;
        let mut ledger = self.lock()?;
        
        let mut next = ledger.clone();
        let record = upsert_in(&mut next, key, update);
        self.persist(&next)?;
        *ledger = next;
        
        Ok(record)
    }
    
    fn get(&self, address: &str) -> Result<Option<WalletRecord>> {
        let key = key_for(address)?;
        Ok(self.lock()?.get(&key).cloned())
    }
    
    fn list(&self) -> Result<Vec<WalletRecord>> {
        Ok(self.lock()?.values().cloned().collect())
    }
    
    fn remove(&self, address: &str) -> Result<bool> {
        let key = key_for(address)?;
        let mut ledger = self.lock()?;
        if !ledger.contains_key(&key) {
            return Ok(false);
        }
        
        let mut next = ledger.clone();
        next.remove(&key);
        self.persist(&next)?;
        *ledger = next;
        
        Ok(true)
    }
    
    fn clear(&self) -> Result<usize> {
        let mut ledger = self.lock()?;
        let count = ledger.len();
        
        let next = Ledger::new();
        self.persist(&next)?;
        *ledger = next;
        
        Ok(count)
    }
    
    fn update(
        &self,
        address: &str,
        f: &mut dyn FnMut(&mut WalletRecord) -> bool,
    ) -> Result<Option<WalletRecord>> {
        let key = key_for(address)?;
        let mut ledger = self.lock()?;
        
        let mut next = ledger.clone();
        let (record, changed) = update_in(&mut next, &key, f);
        if changed {
            self.persist(&next)?;
            *ledger = next;
        }
        
        Ok(record)
    }
}
