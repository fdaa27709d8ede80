//! Periodic exposure audits
//! 
//! Re-runs `ExposureAuditor::audit_all` on a fixed interval until stopped.
//! A tick that finds a batch still running is skipped, never queued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::ExposureAuditor;
use crate::utils::MonitorError;

#[derive(Debug, Default)]
pub struct SchedulerStats {
    pub runs: AtomicU64,
    pub skipped: AtomicU64,
}

pub struct AuditScheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    stats: Arc<SchedulerStats>,
}

impl AuditScheduler {
    /// Spawn the audit loop; the first batch runs after one full interval
    pub fn spawn(auditor: Arc<ExposureAuditor>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(SchedulerStats::default());
        
        tracing::info!("⏱️ Scheduled exposure audits every {}s", interval.as_secs());
        
        let handle = tokio::spawn(audit_loop(auditor, interval, shutdown_rx, stats.clone()));
        
        Self {
            shutdown_tx,
            handle,
            stats,
        }
    }
    
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }
    
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
    
    /// Stop the loop, letting an in-flight batch finish first
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            tracing::error!("Audit scheduler task ended abnormally: {}", e);
        }
        tracing::info!("Audit scheduler stopped");
    }
}

async fn audit_loop(
    auditor: Arc<ExposureAuditor>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
    stats: Arc<SchedulerStats>,
) {
    let start = tokio::time::Instant::now() + period;
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match auditor.audit_all().await {
                    Ok(report) => {
                        stats.runs.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!("Scheduled audit: {:?}", report);
                    }
                    Err(MonitorError::BatchInProgress) => {
                        stats.skipped.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!("Previous batch still running, skipping tick");
                    }
                    Err(e) => {
                        tracing::warn!("Scheduled audit failed: {}", e);
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                tracing::info!("Audit loop shutting down");
                break;
            }
        }
    }
}
