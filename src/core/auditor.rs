use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use ethers::types::U256;
use tokio::sync::Mutex;
use crate::core::policy::{assess, Exposure};
use crate::core::{AlertSink, ChainReader};
use crate::models::{
    Allowance, AlertState, ApprovalState, AuditOutcome, BatchReport, ExposureAlert, Settings,
    WalletRecord,
};
use crate::storage::{LedgerStore, SettingsStore};
use crate::utils::{format_amount, normalize_address, parse_address, parse_amount, MonitorError, Result};

#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Pause between records in a bulk run, to stay under upstream rate limits
    pub batch_delay: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            batch_delay: Duration::from_secs(1),
        }
    }
}

/// Result of evaluating one claimed record
enum Evaluation {
    Skipped { outcome: AuditOutcome, token_balance: String },
    Alerted { alert_id: String, exposed: String },
}

/// Checks approved wallets for allowances that cover their whole balance
/// and alerts the owner once per wallet.
/// 
/// Each record is claimed in the store (`NOT_ATTEMPTED|FAILED -> IN_PROGRESS`)
/// before any chain read, so single, bulk and scheduled runs can interleave
/// without alerting the same wallet twice.
pub struct ExposureAuditor {
    store: Arc<dyn LedgerStore>,
    settings: Arc<SettingsStore>,
    chain: Arc<dyn ChainReader>,
    sink: Arc<dyn AlertSink>,
    config: AuditConfig,
    batch_guard: Mutex<()>,
}

impl ExposureAuditor {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        settings: Arc<SettingsStore>,
        chain: Arc<dyn ChainReader>,
        sink: Arc<dyn AlertSink>,
        config: AuditConfig,
    ) -> Self {
        Self {
            store,
            settings,
            chain,
            sink,
            config,
            batch_guard: Mutex::new(()),
        }
    }
    
    /// Release claims left behind by an interrupted process
    pub fn recover(&self) -> Result<usize> {
        let mut released = 0;
        for record in self.store.list()? {
            if record.alert_state != AlertState::InProgress {
                continue;
            }
            self.store.update(&record.address, &mut |r| {
                if r.alert_state == AlertState::InProgress {
                    r.alert_state = AlertState::NotAttempted;
                    true
                } else {
                    false
                }
            })?;
            released += 1;
        }
        
        if released > 0 {
            tracing::warn!("Released {} stale audit claim(s)", released);
        }
        Ok(released)
    }
    
    /// Audit one wallet
    pub async fn audit_wallet(&self, address: &str) -> Result<AuditOutcome> {
        let key = normalize_address(address)?;
        
        let record = self.store.get(&key)?
            .ok_or_else(|| MonitorError::NotFound(format!("wallet {}", key)))?;
        if record.is_alerted() {
            return Err(MonitorError::AlreadyAlerted(key));
        }
        
        self.process(&key).await
    }
    
    /// One pass over every approved, not yet alerted wallet
    pub async fn audit_all(&self) -> Result<BatchReport> {
        let _guard = self.batch_guard.try_lock()
            .map_err(|_| MonitorError::BatchInProgress)?;
        
        let head = self.chain.block_number().await
            .map_err(|e| MonitorError::ChainUnavailable(e.to_string()))?;
        
        let candidates: Vec<WalletRecord> = self.store.list()?
            .into_iter()
            .filter(|r| r.approval_state == ApprovalState::Granted && r.alert_state.is_claimable())
            .collect();
        
        tracing::info!("🔍 Auditing {} approved wallet(s) at block {}", candidates.len(), head);
        
        let mut report = BatchReport::default();
        for (i, record) in candidates.iter().enumerate() {
            if i > 0 && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
            
            let outcome = match self.process(&record.address).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("Audit of {} failed: {}", record.address, e);
                    AuditOutcome::Failed { reason: e.to_string() }
                }
            };
            report.record(&outcome);
        }
        
        tracing::info!(
            "Audit finished: {} examined, {} alerted, {} dust, {} partial, {} failed",
            report.examined,
            report.alerted,
            report.skipped_dust,
            report.skipped_allowance,
            report.failed
        );
        
        Ok(report)
    }
    
    async fn process(&self, key: &str) -> Result<AuditOutcome> {
        let mut claimed = false;
        let record = self.store.update(key, &mut |r| {
            claimed = r.approval_state == ApprovalState::Granted
                && r.spender.is_some()
                && r.alert_state.is_claimable();
            if claimed {
                r.alert_state = AlertState::InProgress;
            }
            claimed
        })?;
        
        let record = record.ok_or_else(|| MonitorError::NotFound(format!("wallet {}", key)))?;
        if !claimed {
            return Ok(match record.alert_state {
                AlertState::Raised | AlertState::InProgress => AuditOutcome::AlreadyHandled,
                _ => AuditOutcome::NotEligible,
            });
        }
        
        let settings = self.settings.get()?;
        let evaluation = self.evaluate(&record, &settings).await;
        self.finish(key, evaluation)
    }
    
    async fn evaluate(&self, record: &WalletRecord, settings: &Settings) -> Result<Evaluation> {
        let owner = parse_address(&record.address)?;
        let spender_str = record.spender.clone().unwrap_or_default();
        let spender = parse_address(&spender_str)?;
        let token = parse_address(&settings.token_address)?;
        let decimals = settings.token_decimals;
        let threshold = parse_amount(&settings.dust_threshold, decimals)?;
        
        let balance = self.chain.token_balance(token, owner).await?;
        let token_balance = format_amount(balance, decimals)?;
        
        // Only read the allowance when the balance is worth protecting
        let allowance = if balance > threshold {
            self.chain.allowance(token, owner, spender).await?
        } else {
            U256::zero()
        };
        
        match assess(balance, allowance, threshold) {
            Exposure::Dust => {
                tracing::debug!("{} holds dust ({}), skipping", record.address, token_balance);
                return Ok(Evaluation::Skipped { outcome: AuditOutcome::SkippedDust, token_balance });
            }
            Exposure::Partial => {
                tracing::debug!("{} allowance below balance, skipping", record.address);
                return Ok(Evaluation::Skipped { outcome: AuditOutcome::SkippedAllowance, token_balance });
            }
            Exposure::Full => {}
        }
        
        let allowance = Allowance::from_raw(allowance);
        let alert = ExposureAlert {
            owner: record.address.clone(),
            spender: spender_str,
            token: settings.token_address.clone(),
            balance: token_balance.clone(),
            allowance: match allowance {
                Allowance::Unlimited => allowance.to_string(),
                Allowance::Bounded(raw) => format_amount(raw, decimals)?,
            },
            unlimited: allowance.is_unlimited(),
            approval_tx_hash: record.approval_tx_hash.clone(),
            detected_at: Utc::now(),
        };
        
        let alert_id = self.sink.deliver(&alert).await
            .map_err(|e| MonitorError::AlertFailed(format!("{}: {}", self.sink.name(), e)))?;
        
        tracing::warn!("🚨 Exposure alert {} sent for {}", alert_id, record.address);
        
        Ok(Evaluation::Alerted { alert_id, exposed: token_balance })
    }
    
    /// Write the terminal state for a claimed record
    fn finish(&self, key: &str, evaluation: Result<Evaluation>) -> Result<AuditOutcome> {
        let outcome = match &evaluation {
            Ok(Evaluation::Skipped { outcome, .. }) => outcome.clone(),
            Ok(Evaluation::Alerted { alert_id, .. }) => AuditOutcome::Alerted { alert_id: alert_id.clone() },
            Err(e) => AuditOutcome::Failed { reason: e.to_string() },
        };
        
        self.store.update(key, &mut |r| {
            match &evaluation {
                Ok(Evaluation::Skipped { token_balance, .. }) => {
                    r.alert_state = AlertState::NotAttempted;
                    r.token_balance = token_balance.clone();
                }
                Ok(Evaluation::Alerted { alert_id, exposed }) => {
                    r.alert_state = AlertState::Raised;
                    r.alert_id = Some(alert_id.clone());
                    r.exposed_amount = Some(exposed.clone());
                    r.token_balance = exposed.clone();
                    r.alerted_at = Some(Utc::now());
                }
                Err(e) => {
                    r.alert_state = AlertState::Failed(e.to_string());
                    r.failure_count += 1;
                }
            }
            true
        })?;
        
        if let Err(e) = &evaluation {
            tracing::warn!("Audit of {} failed: {}", key, e);
        }
        
        Ok(outcome)
    }
}
