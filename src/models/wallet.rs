use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalState {
    #[default]
    None,
    Pending,
    Granted,
}

/// Progress of the one-shot exposure alert for a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertState {
    #[default]
    NotAttempted,
    InProgress,
    Raised,
    Failed(String),
}

impl AlertState {
    /// Whether an auditor may claim this record
    pub fn is_claimable(&self) -> bool {
        matches!(self, AlertState::NotAttempted | AlertState::Failed(_))
    }
}

/// Approved amount in raw token units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Allowance {
    Unlimited,
    Bounded(U256),
}

impl Allowance {
    pub fn from_raw(value: U256) -> Self {
        if value == U256::MAX {
            Allowance::Unlimited
        } else {
            Allowance::Bounded(value)
        }
    }
    
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Allowance::Unlimited)
    }
    
    pub fn as_raw(&self) -> U256 {
        match self {
            Allowance::Unlimited => U256::MAX,
            Allowance::Bounded(v) => *v,
        }
    }
}

impl Default for Allowance {
    fn default() -> Self {
        Allowance::Bounded(U256::zero())
    }
}

impl TryFrom<String> for Allowance {
    type Error = String;
    
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("unlimited") || value.eq_ignore_ascii_case("max") {
            return Ok(Allowance::Unlimited);
        }
        U256::from_dec_str(value)
            .map(Allowance::from_raw)
            .map_err(|_| format!("invalid allowance amount: {}", value))
    }
}

impl From<Allowance> for String {
    fn from(value: Allowance) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allowance::Unlimited => write!(f, "unlimited"),
            Allowance::Bounded(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub address: String,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub native_balance: String,
    pub token_balance: String,
    pub approval_state: ApprovalState,
    pub approved_amount: Allowance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_tx_hash: Option<String>,
    pub alert_state: AlertState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposed_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_count: u32,
}

impl WalletRecord {
    /// `address` must already be normalized
    pub fn new(address: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            address: address.into(),
            first_seen_at: now,
            last_seen_at: now,
            native_balance: "0".to_string(),
            token_balance: "0".to_string(),
            approval_state: ApprovalState::None,
            approved_amount: Allowance::default(),
            spender: None,
            approval_tx_hash: None,
            alert_state: AlertState::NotAttempted,
            exposed_amount: None,
            alert_id: None,
            alerted_at: None,
            failure_count: 0,
        }
    }
    
    pub fn apply(&mut self, update: WalletUpdate, now: DateTime<Utc>) {
        self.last_seen_at = now;
        
        if let Some(native) = update.native_balance {
            self.native_balance = native;
        }
        if let Some(token) = update.token_balance {
            self.token_balance = token;
        }
        if let Some(grant) = update.approval {
            // an alerted record stays GRANTED
            self.approval_state = if grant.confirmed || self.is_alerted() {
                ApprovalState::Granted
            } else {
                ApprovalState::Pending
            };
            self.approved_amount = grant.amount;
            self.spender = Some(grant.spender);
            if grant.tx_hash.is_some() {
                self.approval_tx_hash = grant.tx_hash;
            }
        }
    }
    
    pub fn is_alerted(&self) -> bool {
        self.alert_state == AlertState::Raised
    }
}

/// A reported approval
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalGrant {
    pub spender: String,
    pub amount: Allowance,
    pub tx_hash: Option<String>,
    pub confirmed: bool,
}

/// Partial update applied by `LedgerStore::upsert`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletUpdate {
    pub native_balance: Option<String>,
    pub token_balance: Option<String>,
    pub approval: Option<ApprovalGrant>,
}

impl WalletUpdate {
    pub fn balances(native: Option<String>, token: Option<String>) -> Self {
        Self {
            native_balance: native,
            token_balance: token,
            approval: None,
        }
    }
    
    pub fn approval(grant: ApprovalGrant) -> Self {
        Self {
            approval: Some(grant),
            ..Self::default()
        }
    }
}
