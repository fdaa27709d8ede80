use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ethers::types::{Address, U256};
use serde_json::{json, Value};
use tower::ServiceExt;
use wallet_monitor::api::{create_router, AppState};
use wallet_monitor::core::{AuditConfig, ExposureAuditor};
use wallet_monitor::indexer::{IndexerClient, IndexerConfig};
use wallet_monitor::models::{Chain, ExposureAlert, Settings};
use wallet_monitor::storage::{LedgerStore, MemoryStore, SettingsStore};
use wallet_monitor::{AlertSink, ChainReader, Result};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WALLET: &str = "0xA1077a294dDE1B09bB078844df40758a5D0f9a27";
const SPENDER: &str = "0x1111111111111111111111111111111111111111";
const TOKEN: &str = "0x55d398326f99059ff775485246999027b3197955";

const BAD_ADDRESSES: [&str; 5] = [
    "",
    "A1077a294dDE1B09bB078844df40758a5D0f9a27",
    "0xA1077a294dDE1B09bB078844df40758a5D0f9a2",
    "0xA1077a294dDE1B09bB078844df40758a5D0f9a277",
    "0xG1077a294dDE1B09bB078844df40758a5D0f9a27",
];

/// Every wallet holds 5 tokens with an unlimited allowance
struct FixedChain;

#[async_trait]
impl ChainReader for FixedChain {
    async fn block_number(&self) -> Result<u64> {
        Ok(1)
    }
    
    async fn token_balance(&self, _token: Address, _owner: Address) -> Result<U256> {
        Ok(U256::from(5u64) * U256::exp10(18))
    }
    
    async fn allowance(&self, _token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        Ok(U256::MAX)
    }
}

#[derive(Default)]
struct CountingSink(AtomicUsize);

#[async_trait]
impl AlertSink for CountingSink {
    fn name(&self) -> &'static str {
        "counting"
    }
    
    async fn deliver(&self, _alert: &ExposureAlert) -> Result<String> {
        let n = self.0.fetch_add(1, Ordering::SeqCst);
        Ok(format!("alert-{}", n))
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    sink: Arc<CountingSink>,
}

fn app(indexer_url: &str) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let settings = Arc::new(SettingsStore::in_memory(Settings::new(TOKEN, 18, Chain::Bsc)));
    let sink = Arc::new(CountingSink::default());
    let indexer = Arc::new(
        IndexerClient::new(IndexerConfig {
            base_url: indexer_url.to_string(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(2),
            max_retries: 0,
            backoff: Duration::from_millis(1),
        })
        .unwrap(),
    );
    let auditor = Arc::new(ExposureAuditor::new(
        store.clone(),
        settings.clone(),
        Arc::new(FixedChain),
        sink.clone(),
        AuditConfig { batch_delay: Duration::ZERO },
    ));
    
    let router = create_router(AppState {
        store: store.clone(),
        settings,
        indexer,
        auditor,
    });
    
    TestApp { router, store, sink }
}

fn offline_app() -> TestApp {
    // requests that pass validation would fail here, so a 400 proves nothing was sent
    app("http://127.0.0.1:9")
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_malformed_addresses_rejected_everywhere() {
    let app = offline_app();
    
    for bad in BAD_ADDRESSES {
        let (status, body) = send(&app.router, "POST", "/wallet-event", Some(json!({ "address": bad }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "wallet-event {:?}", bad);
        assert_eq!(body["success"], false);
        
        let (status, _) = send(
            &app.router,
            "POST",
            "/approval-event",
            Some(json!({ "address": bad, "spender": SPENDER, "amount": "unlimited" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "approval-event {:?}", bad);
        
        let (status, _) = send(
            &app.router,
            "POST",
            "/approval-event",
            Some(json!({ "address": WALLET, "spender": bad, "amount": "unlimited" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "approval-event spender {:?}", bad);
        
        let (status, _) = send(&app.router, "POST", "/balances", Some(json!({ "address": bad }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "balances {:?}", bad);
        
        if !bad.is_empty() {
            for (method, prefix) in [("GET", "/wallets/"), ("DELETE", "/wallets/"), ("POST", "/audit/")] {
                let (status, _) = send(&app.router, method, &format!("{}{}", prefix, bad), None).await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}{}", method, prefix, bad);
            }
        }
    }
    
    assert!(app.store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_tx_hash_rejected() {
    let app = offline_app();
    
    let (status, body) = send(&app.router, "GET", "/transaction?hash=0x1234&chain=bsc", None).await;
    
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("0x1234"));
}

#[tokio::test]
async fn test_wallet_event_upserts() {
    let app = offline_app();
    
    let (status, body) = send(
        &app.router,
        "POST",
        "/wallet-event",
        Some(json!({ "address": WALLET, "nativeBalance": "0.5", "tokenBalance": "12" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["existing"], false);
    assert_eq!(body["wallet"]["address"], WALLET.to_lowercase());
    
    let (_, body) = send(
        &app.router,
        "POST",
        "/wallet-event",
        Some(json!({ "address": WALLET.to_lowercase(), "tokenBalance": "13" })),
    )
    .await;
    assert_eq!(body["existing"], true);
    assert_eq!(body["wallet"]["nativeBalance"], "0.5");
    assert_eq!(body["wallet"]["tokenBalance"], "13");
    assert_eq!(app.store.list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_decimal_balance_rejected() {
    let app = offline_app();
    
    let (status, _) = send(
        &app.router,
        "POST",
        "/wallet-event",
        Some(json!({ "address": WALLET, "tokenBalance": "lots" })),
    )
    .await;
    
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_approval_then_audit_alerts_once() {
    let app = offline_app();
    
    let (status, body) = send(
        &app.router,
        "POST",
        "/approval-event",
        Some(json!({
            "address": WALLET,
            "spender": SPENDER,
            "amount": U256::MAX.to_string(),
            "txHash": format!("0x{}", "ef".repeat(32)),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wallet"]["approvalState"], "GRANTED");
    assert_eq!(body["wallet"]["approvedAmount"], "unlimited");
    
    let (status, body) = send(&app.router, "POST", &format!("/audit/{}", WALLET), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["outcome"], "ALERTED");
    
    let (status, _) = send(&app.router, "POST", &format!("/audit/{}", WALLET), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    
    let (status, body) = send(&app.router, "POST", "/audit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["examined"], 0);
    
    assert_eq!(app.sink.0.load(Ordering::SeqCst), 1);
    let (_, body) = send(&app.router, "GET", &format!("/wallets/{}", WALLET), None).await;
    assert_eq!(body["wallet"]["alertState"]["state"], "RAISED");
    assert_eq!(body["wallet"]["exposedAmount"], "5");
}

#[tokio::test]
async fn test_bad_approval_amount_rejected() {
    let app = offline_app();
    
    let (status, _) = send(
        &app.router,
        "POST",
        "/approval-event",
        Some(json!({ "address": WALLET, "spender": SPENDER, "amount": "-5" })),
    )
    .await;
    
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_audit_unknown_wallet_is_not_found() {
    let app = offline_app();
    let (status, _) = send(&app.router, "POST", &format!("/audit/{}", WALLET), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_remove_clear() {
    let app = offline_app();
    for i in 1..=3u64 {
        let address = format!("0x{:040x}", i);
        send(&app.router, "POST", "/wallet-event", Some(json!({ "address": address }))).await;
    }
    
    let (_, body) = send(&app.router, "GET", "/wallets", None).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["wallets"].as_array().unwrap().len(), 3);
    
    let first = format!("0x{:040x}", 1);
    let (status, _) = send(&app.router, "DELETE", &format!("/wallets/{}", first), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app.router, "DELETE", &format!("/wallets/{}", first), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    
    let (_, body) = send(&app.router, "DELETE", "/wallets", None).await;
    assert_eq!(body["removed"], 2);
    assert!(app.store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_settings_update() {
    let app = offline_app();
    
    let (status, _) = send(
        &app.router,
        "PUT",
        "/settings",
        Some(json!({ "tokenAddress": "nope", "tokenDecimals": 18, "chain": "bsc", "dustThreshold": "0.1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    
    let (status, body) = send(
        &app.router,
        "PUT",
        "/settings",
        Some(json!({ "tokenAddress": TOKEN.to_uppercase().replace("0X", "0x"), "tokenDecimals": 6, "chain": "polygon", "dustThreshold": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["tokenAddress"], TOKEN);
    
    let (_, body) = send(&app.router, "GET", "/settings", None).await;
    assert_eq!(body["settings"]["chain"], "polygon");
    assert_eq!(body["settings"]["tokenDecimals"], 6);
}

#[tokio::test]
async fn test_balances_refresh_known_wallet() {
    let server = MockServer::start().await;
    let key = WALLET.to_lowercase();
    Mock::given(method("GET"))
        .and(path(format!("/{}/balance", key)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "balance": "2000000000000000000" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/erc20", key)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "balance": "7500000000000000000" }])))
        .mount(&server)
        .await;
    
    let app = app(&server.uri());
    send(&app.router, "POST", "/wallet-event", Some(json!({ "address": WALLET }))).await;
    
    let (status, body) = send(&app.router, "POST", "/balances", Some(json!({ "address": WALLET }))).await;
    
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balances"]["native"], "2");
    assert_eq!(body["balances"]["token"], "7.5");
    let record = app.store.get(WALLET).unwrap().unwrap();
    assert_eq!(record.token_balance, "7.5");
}

#[tokio::test]
async fn test_rate_limited_balance_surfaces_429() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    
    let app = app(&server.uri());
    let (status, body) = send(&app.router, "POST", "/balances", Some(json!({ "address": WALLET }))).await;
    
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_health() {
    let app = offline_app();
    let (status, body) = send(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
