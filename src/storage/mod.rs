//! Wallet ledger persistence
//! 
//! `LedgerStore` is the seam the API and the auditor are written against.
//! Two implementations: an in-memory map and a JSON snapshot file that is
//! replaced atomically on every write.

mod memory;
mod file;
mod settings;

pub use memory::MemoryStore;
pub use file::FileStore;
pub use settings::SettingsStore;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use chrono::Utc;
use crate::models::{WalletRecord, WalletUpdate};
use crate::utils::{normalize_address, MonitorError, Result};

/// Keyed by lowercase address
pub trait LedgerStore: Send + Sync {
    /// Create the record on first sight, otherwise merge `update` into it
    fn upsert(&self, address: &str, update: WalletUpdate) -> Result<WalletRecord>;
    
    fn get(&self, address: &str) -> Result<Option<WalletRecord>>;
    
    fn list(&self) -> Result<Vec<WalletRecord>>;
    
    fn remove(&self, address: &str) -> Result<bool>;
    
    /// Returns the number of records dropped
    fn clear(&self) -> Result<usize>;
    
    /// Atomic read-modify-write of one record.
    /// 
    /// `f` returns whether it changed anything; nothing is written otherwise.
    /// Returns the record as it is after the call, or `None` if absent.
    fn update(
        &self,
        address: &str,
        f: &mut dyn FnMut(&mut WalletRecord) -> bool,
    ) -> Result<Option<WalletRecord>>;
}

type Ledger = BTreeMap<String, WalletRecord>;

fn upsert_in(ledger: &mut Ledger, key: String, update: WalletUpdate) -> WalletRecord {
    let now = Utc::now();
    let record = ledger
        .entry(key.clone())
        .or_insert_with(|| {
            tracing::info!("✅ New wallet recorded: {}", key);
            WalletRecord::new(key, now)
        });
    record.apply(update, now);
    record.clone()
}

fn update_in(
    ledger: &mut Ledger,
    key: &str,
    f: &mut dyn FnMut(&mut WalletRecord) -> bool,
) -> (Option<WalletRecord>, bool) {
    match ledger.get_mut(key) {
        Some(record) => {
            let changed = f(record);
            (Some(record.clone()), changed)
        }
        None => (None, false),
    }
}

fn key_for(address: &str) -> Result<String> {
    normalize_address(address)
}

/// Write `bytes` to a sibling temp file, fsync it, then rename it over `path`
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| MonitorError::Storage(format!("replace {}: {}", path.display(), e.error)))?;
    
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshot.json");
        
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        // only the target remains, no stray temp files
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
