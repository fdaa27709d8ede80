use std::sync::Arc;
use clap::Parser;
use wallet_monitor::alerts::{LogSink, WebhookSink};
use wallet_monitor::api::{run_server, AppState};
use wallet_monitor::blockchain::BlockchainClient;
use wallet_monitor::config::Config;
use wallet_monitor::indexer::IndexerClient;
use wallet_monitor::storage::{FileStore, LedgerStore, SettingsStore};
use wallet_monitor::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    
    // Initialize logging
    let default_filter = if config.verbose { "wallet_monitor=debug" } else { "wallet_monitor=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter))
        )
        .init();
    
    // Storage
    let store: Arc<dyn LedgerStore> = Arc::new(FileStore::open(config.wallets_path())?);
    let settings = Arc::new(SettingsStore::open(config.settings_path(), config.default_settings())?);
    
    // Upstreams
    let indexer = Arc::new(IndexerClient::new(config.indexer())?);
    let chain = Arc::new(BlockchainClient::new(&config.rpc_url, config.request_timeout()).await?);
    tracing::info!("✓ Connected to {}", chain.chain_name());
    
    let sink: Arc<dyn AlertSink> = match &config.webhook_url {
        Some(url) => Arc::new(WebhookSink::new(url.clone(), config.request_timeout())?),
        None => Arc::new(LogSink),
    };
    
    let auditor = Arc::new(ExposureAuditor::new(
        store.clone(),
        settings.clone(),
        chain,
        sink,
        config.audit(),
    ));
    auditor.recover()?;
    
    let scheduler = config
        .audit_interval()
        .map(|interval| AuditScheduler::spawn(auditor.clone(), interval));
    
    let state = AppState {
        store,
        settings,
        indexer,
        auditor,
    };
    
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Shutdown signal received");
    };
    
    run_server(state, &config.bind, shutdown).await?;
    
    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }
    
    Ok(())
}
