use std::path::{Path, PathBuf};
use std::sync::RwLock;
use crate::models::Settings;
use crate::utils::{MonitorError, Result};
use super::write_atomic;

/// Single settings object kept next to the ledger
pub struct SettingsStore {
    path: Option<PathBuf>,
    current: RwLock<Settings>,
}

impl SettingsStore {
    /// Settings that are never written to disk
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            path: None,
            current: RwLock::new(settings),
        }
    }
    
    /// Load from `path`, or start from `default` if the file does not exist yet
    pub fn open(path: impl AsRef<Path>, default: Settings) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let settings = if path.exists() {
            serde_json::from_slice(&std::fs::read(&path)?)?
        } else {
            default
        };
        
        Ok(Self {
            path: Some(path),
            current: RwLock::new(settings),
        })
    }
    
    pub fn get(&self) -> Result<Settings> {
        self.current
            .read()
            .map(|s| s.clone())
            .map_err(|_| MonitorError::Storage("settings lock poisoned".to_string()))
    }
    
    pub fn set(&self, settings: Settings) -> Result<()> {
        let mut current = self
            .current
            .write()
            .map_err(|_| MonitorError::Storage("settings lock poisoned".to_string()))?;
        
        if let Some(path) = &self.path {
            write_atomic(path, &serde_json::to_vec_pretty(&settings)?)?;
        }
        *current = settings;
        
        Ok(())
    }
}
