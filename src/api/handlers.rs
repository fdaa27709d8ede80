//! Axum handlers for the monitor API

use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::ExposureAuditor;
use crate::indexer::IndexerClient;
use crate::models::{Allowance, ApprovalGrant, Chain, Settings, WalletUpdate};
use crate::storage::{LedgerStore, SettingsStore};
use crate::utils::{is_decimal, normalize_address, parse_tx_hash, MonitorError, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub settings: Arc<SettingsStore>,
    pub indexer: Arc<IndexerClient>,
    pub auditor: Arc<ExposureAuditor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletEvent {
    pub address: String,
    pub native_balance: Option<String>,
    pub token_balance: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEvent {
    pub address: String,
    pub spender: String,
    pub amount: String,
    pub tx_hash: Option<String>,
    /// Unconfirmed approvals are recorded as pending
    #[serde(default = "default_confirmed")]
    pub confirmed: bool,
}

fn default_confirmed() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub hash: String,
    pub chain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BalancesRequest {
    pub address: String,
}

fn check_balance(field: &str, value: &Option<String>) -> Result<()> {
    match value {
        Some(v) if !is_decimal(v) => Err(MonitorError::Validation(format!(
            "{} must be a decimal string",
            field
        ))),
        _ => Ok(()),
    }
}

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /wallet-event
/// Records a wallet that opted in, with its balance snapshot
pub async fn wallet_event(
    State(state): State<AppState>,
    Json(event): Json<WalletEvent>,
) -> Result<Json<Value>> {
    let address = normalize_address(&event.address)?;
    check_balance("nativeBalance", &event.native_balance)?;
    check_balance("tokenBalance", &event.token_balance)?;
    
    let existing = state.store.get(&address)?.is_some();
    let record = state.store.upsert(
        &address,
        WalletUpdate::balances(event.native_balance, event.token_balance),
    )?;
    
    Ok(Json(json!({
        "success": true,
        "existing": existing,
        "wallet": record,
    })))
}

/// POST /approval-event
/// Records an approval the wallet granted, so its exposure can be audited
pub async fn approval_event(
    State(state): State<AppState>,
    Json(event): Json<ApprovalEvent>,
) -> Result<Json<Value>> {
    let address = normalize_address(&event.address)?;
    let spender = normalize_address(&event.spender)?;
    let amount = Allowance::try_from(event.amount).map_err(MonitorError::Validation)?;
    let tx_hash = match event.tx_hash.as_deref().filter(|h| !h.is_empty()) {
        Some(h) => Some(format!("{:?}", parse_tx_hash(h)?)),
        None => None,
    };
    
    let record = state.store.upsert(
        &address,
        WalletUpdate::approval(ApprovalGrant {
            spender,
            amount,
            tx_hash,
            confirmed: event.confirmed,
        }),
    )?;
    
    tracing::info!("Approval recorded for {} ({})", record.address, record.approved_amount);
    
    Ok(Json(json!({
        "success": true,
        "wallet": record,
    })))
}

/// GET /transaction?hash=&chain=
pub async fn get_transaction(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Value>> {
    let chain = match query.chain.as_deref() {
        Some(name) => Chain::from_name(name),
        None => state.settings.get()?.chain,
    };
    let tx = state.indexer.get_transaction(&query.hash, chain).await?;
    
    Ok(Json(json!({
        "success": true,
        "transaction": tx,
    })))
}

/// POST /balances
/// Live balance lookup; refreshes the snapshot of a known wallet
pub async fn balances(
    State(state): State<AppState>,
    Json(request): Json<BalancesRequest>,
) -> Result<Json<Value>> {
    let address = normalize_address(&request.address)?;
    let settings = state.settings.get()?;
    
    let balances = state
        .indexer
        .get_balances(&address, settings.chain, &settings.token())
        .await?;
    
    if state.store.get(&address)?.is_some() {
        state.store.upsert(
            &address,
            WalletUpdate::balances(Some(balances.native.clone()), Some(balances.token.clone())),
        )?;
    }
    
    Ok(Json(json!({
        "success": true,
        "balances": balances,
    })))
}

/// GET /wallets
pub async fn list_wallets(State(state): State<AppState>) -> Result<Json<Value>> {
    let wallets = state.store.list()?;
    Ok(Json(json!({
        "success": true,
        "count": wallets.len(),
        "wallets": wallets,
    })))
}

/// GET /wallets/:address
pub async fn get_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Value>> {
    let record = state
        .store
        .get(&address)?
        .ok_or_else(|| MonitorError::NotFound(format!("wallet {}", address)))?;
    Ok(Json(json!({ "success": true, "wallet": record })))
}

/// DELETE /wallets/:address
pub async fn remove_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Value>> {
    if !state.store.remove(&address)? {
        return Err(MonitorError::NotFound(format!("wallet {}", address)));
    }
    tracing::info!("Removed wallet {}", address);
    Ok(Json(json!({ "success": true })))
}

/// DELETE /wallets
pub async fn clear_wallets(State(state): State<AppState>) -> Result<Json<Value>> {
    let removed = state.store.clear()?;
    tracing::info!("Cleared {} wallet(s)", removed);
    Ok(Json(json!({ "success": true, "removed": removed })))
}

/// POST /audit
pub async fn audit_all(State(state): State<AppState>) -> Result<Json<Value>> {
    let report = state.auditor.audit_all().await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

/// POST /audit/:address
pub async fn audit_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Value>> {
    let outcome = state.auditor.audit_wallet(&address).await?;
    Ok(Json(json!({ "success": true, "result": outcome })))
}

/// GET /settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Value>> {
    Ok(Json(json!({ "success": true, "settings": state.settings.get()? })))
}

/// PUT /settings
pub async fn put_settings(
    State(state): State<AppState>,
    Json(mut settings): Json<Settings>,
) -> Result<Json<Value>> {
    settings.token_address = normalize_address(&settings.token_address)?;
    if !is_decimal(&settings.dust_threshold) {
        return Err(MonitorError::Validation("dustThreshold must be a decimal string".into()));
    }
    if settings.token_decimals > 77 {
        return Err(MonitorError::Validation("tokenDecimals out of range".into()));
    }
    
    state.settings.set(settings.clone())?;
    tracing::info!("Settings updated: token {}", settings.token_address);
    
    Ok(Json(json!({ "success": true, "settings": settings })))
}
