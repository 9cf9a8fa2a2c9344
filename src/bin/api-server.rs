//! RSI radar API server
//!
//! Hosts the ticker monitor (periodic multi-timeframe refresh and
//! auto-orders), the overbought scanner and the JSON API over both.

use dotenvy::dotenv;
use rsi_radar::config;
use rsi_radar::core::http::{start_server, AppState};
use rsi_radar::core::scheduler::RefreshScheduler;
use rsi_radar::logging;
use rsi_radar::monitor::Monitor;
use rsi_radar::scanner::OverboughtScanner;
use rsi_radar::services::bybit::{BybitOrderSink, BybitRestClient};
use rsi_radar::services::orders::{DryRunOrderSink, OrderSink};
use rsi_radar::signals::pipeline::PipelineConfig;
use rsi_radar::storage::AutoOrderStore;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let port = config::get_port();
    let env = config::get_environment();
    info!("Starting RSI radar API server");
    info!(environment = %env, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);

    let client = BybitRestClient::new(&config::get_bybit_base_url())?;
    let orders: Arc<dyn OrderSink> = match config::get_bybit_credentials() {
        Some(credentials) => {
            info!("Bybit credentials found, orders will be sent to the exchange");
            Arc::new(BybitOrderSink::new(client.clone(), credentials))
        }
        None => {
            warn!("No Bybit credentials, orders run in dry-run mode");
            Arc::new(DryRunOrderSink::new())
        }
    };

    let source = Arc::new(client);
    let auto_orders = Arc::new(AutoOrderStore::load(config::get_auto_order_state_path()).await);
    let pipeline_config = PipelineConfig {
        period: config::get_rsi_period(),
        ..PipelineConfig::default()
    };
    let monitor = Arc::new(Monitor::new(
        source.clone(),
        pipeline_config,
        config::default_tickers(),
        orders,
        auto_orders,
    ));
    let scanner = Arc::new(OverboughtScanner::new(source.clone(), config::get_scan_config())?);

    // Fill tables right away, then on schedule
    monitor.refresh_tables().await;
    let scheduler = RefreshScheduler::new(monitor.clone(), config::get_refresh_interval_seconds())?;
    scheduler.start().await;

    let state = AppState::new(monitor, scanner, source);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(state, port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
            scheduler.stop().await;
            info!("API server stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
