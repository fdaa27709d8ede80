use wallet_monitor::blockchain::BlockchainClient;
use wallet_monitor::core::{assess, ChainReader, Exposure};
use wallet_monitor::models::Allowance;
use wallet_monitor::utils::{format_amount, parse_address, parse_amount};
use std::time::Duration;
use clap::Parser;

/// Check whether a spender's allowance covers a wallet's token balance
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Wallet that granted the approval
    #[arg(value_name = "OWNER")]
    owner: String,
    
    /// Contract or account holding the allowance
    #[arg(value_name = "SPENDER")]
    spender: String,
    
    /// ERC-20 token contract
    #[arg(short, long, default_value = "0x55d398326f99059fF775485246999027B3197955")]
    token: String,
    
    /// JSON-RPC URL
    #[arg(short, long, default_value = "https://bsc-dataseed.binance.org/")]
    rpc: String,
    
    /// Balances at or below this are ignored
    #[arg(long, default_value = "0.1")]
    dust: String,
    
    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    
    // Setup logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("wallet_monitor=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("wallet_monitor=warn")
            .init();
    }
    
    let owner = parse_address(&args.owner)?;
    let spender = parse_address(&args.spender)?;
    let token = parse_address(&args.token)?;
    
    println!("\n🔍 Allowance Exposure Check");
    println!("===========================\n");
    println!("👛 Owner:   {:?}", owner);
    println!("🔑 Spender: {:?}", spender);
    println!("🪙 Token:   {:?}\n", token);
    
    let client = BlockchainClient::new(&args.rpc, Duration::from_secs(15)).await?;
    println!("✅ Connected to {}", client.chain_name());
    
    let decimals = client.token_decimals(token).await? as u32;
    let symbol = client.token_symbol(token).await.unwrap_or_else(|_| "tokens".to_string());
    let threshold = parse_amount(&args.dust, decimals)?;
    
    let balance = client.token_balance(token, owner).await?;
    let allowance = client.allowance(token, owner, spender).await?;
    
    println!("\n📊 Balance:   {} {}", format_amount(balance, decimals)?, symbol);
    match Allowance::from_raw(allowance) {
        Allowance::Unlimited => println!("📊 Allowance: UNLIMITED"),
        Allowance::Bounded(raw) => println!("📊 Allowance: {} {}", format_amount(raw, decimals)?, symbol),
    }
    println!();
    
    // Exit code: 0 = not exposed, 1 = fully exposed
    match assess(balance, allowance, threshold) {
        Exposure::Dust => {
            println!("🟢 Balance below {} {}, nothing at risk", args.dust, symbol);
        }
        Exposure::Partial => {
            println!("🟡 Allowance covers part of the balance");
            println!("   Consider revoking it if you no longer use this spender.");
        }
        Exposure::Full => {
            println!("🔴 Spender can move the ENTIRE balance");
            println!("   Revoke the approval unless you trust this spender.");
            std::process::exit(1);
        }
    }
    
    Ok(())
}
