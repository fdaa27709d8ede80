use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notice sent to a wallet owner whose balance is fully covered by an allowance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureAlert {
    pub owner: String,
    pub spender: String,
    pub token: String,
    pub balance: String,
    pub allowance: String,
    pub unlimited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_tx_hash: Option<String>,
    pub detected_at: DateTime<Utc>,
}

impl ExposureAlert {
    pub fn summary(&self) -> String {
        let scope = if self.unlimited { "an unlimited" } else { "a" };
        format!(
            "{} has {} allowance for {} on token {} covering its full balance of {}; revoke it if unintended",
            self.owner, scope, self.spender, self.token, self.balance
        )
    }
}

/// What happened to one record during an audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    Alerted { alert_id: String },
    SkippedDust,
    SkippedAllowance,
    AlreadyHandled,
    NotEligible,
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub examined: usize,
    pub alerted: usize,
    pub skipped_dust: usize,
    pub skipped_allowance: usize,
    pub already_handled: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &AuditOutcome) {
        self.examined += 1;
        match outcome {
            AuditOutcome::Alerted { .. } => self.alerted += 1,
            AuditOutcome::SkippedDust => self.skipped_dust += 1,
            AuditOutcome::SkippedAllowance => self.skipped_allowance += 1,
            AuditOutcome::AlreadyHandled | AuditOutcome::NotEligible => self.already_handled += 1,
            AuditOutcome::Failed { .. } => self.failed += 1,
        }
    }
}
