//! Test utilities for API server integration tests

use crate::test_utils::{pipeline_config, seed_symbol};
use axum_test::TestServer;
use rsi_radar::core::http::{create_router, AppState};
use rsi_radar::models::strategy::{ShortCriteria, TickerCriteria};
use rsi_radar::monitor::Monitor;
use rsi_radar::scanner::{OverboughtScanner, ScanConfig};
use rsi_radar::services::memory::InMemoryCandleSource;
use rsi_radar::services::orders::DryRunOrderSink;
use rsi_radar::storage::AutoOrderStore;
use std::sync::Arc;
use tempfile::TempDir;

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub monitor: Arc<Monitor>,
    pub scanner: Arc<OverboughtScanner>,
    pub source: Arc<InMemoryCandleSource>,
    _dir: TempDir,
}

impl TestApiServer {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = Arc::new(InMemoryCandleSource::new());
        seed_symbol(&source, "HYPEUSDT", 30);
        seed_symbol(&source, "BTCUSDT", 30);

        let store = Arc::new(AutoOrderStore::load(dir.path().join("auto_orders.json")).await);
        let monitor = Arc::new(Monitor::new(
            source.clone(),
            pipeline_config(),
            vec![
                TickerCriteria::short_only("HYPEUSDT", ShortCriteria::default()),
                TickerCriteria::short_only("BTCUSDT", ShortCriteria::default()),
            ],
            Arc::new(DryRunOrderSink::new()),
            store,
        ));
        let scanner = Arc::new(
            OverboughtScanner::new(
                source.clone(),
                ScanConfig::default().with_pool_size(2).with_max_inflight(4),
            )
            .expect("scanner"),
        );

        let state = AppState::new(monitor.clone(), scanner.clone(), source.clone());
        let server = TestServer::new(create_router(state)).expect("start test server");

        Self {
            server,
            monitor,
            scanner,
            source,
            _dir: dir,
        }
    }
}
