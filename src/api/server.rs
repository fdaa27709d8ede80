//! Router construction and serving

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::trace::TraceLayer;

use super::handlers::*;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        
        // Wallet reports
        .route("/wallet-event", post(wallet_event))
        .route("/approval-event", post(approval_event))
        
        // Indexer lookups
        .route("/transaction", get(get_transaction))
        .route("/balances", post(balances))
        
        // Ledger administration
        .route("/wallets", get(list_wallets).delete(clear_wallets))
        .route("/wallets/:address", get(get_wallet).delete(remove_wallet))
        
        // Exposure audits
        .route("/audit", post(audit_all))
        .route("/audit/:address", post(audit_wallet))
        
        .route("/settings", get(get_settings).put(put_settings))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(
    state: AppState,
    bind: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> crate::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    
    tracing::info!("🚀 Wallet monitor listening on http://{}", bind);
    
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    
    Ok(())
}
