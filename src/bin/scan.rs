//! One-shot overbought scan
//!
//! Scans the symbols given on the command line (or every trading USDT
//! perpetual when none are given) and prints the snapshot as JSON.

use dotenvy::dotenv;
use rsi_radar::config;
use rsi_radar::logging;
use rsi_radar::scanner::OverboughtScanner;
use rsi_radar::services::bybit::BybitRestClient;
use std::env;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let client = Arc::new(BybitRestClient::new(&config::get_bybit_base_url())?);
    let scanner = OverboughtScanner::new(client.clone(), config::get_scan_config())?;

    let symbols: Vec<String> = env::args().skip(1).map(|s| s.to_uppercase()).collect();
    let outcome = if symbols.is_empty() {
        scanner.scan_all(client.as_ref()).await?
    } else {
        scanner.scan(&symbols).await
    };

    info!(outcome = outcome.as_str(), "Scan finished");
    if let Some(snapshot) = outcome.snapshot() {
        println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
    }

    Ok(())
}
