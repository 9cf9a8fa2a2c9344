//! Integration tests for the ticker monitor

use crate::test_utils::{pipeline_config, seed_symbol};
use rsi_radar::models::strategy::{ShortCriteria, TickerCriteria};
use rsi_radar::models::timeframe::Timeframe;
use rsi_radar::monitor::Monitor;
use rsi_radar::services::memory::InMemoryCandleSource;
use rsi_radar::services::orders::DryRunOrderSink;
use rsi_radar::storage::AutoOrderStore;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    monitor: Monitor,
    source: Arc<InMemoryCandleSource>,
    orders: Arc<DryRunOrderSink>,
    _dir: TempDir,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(InMemoryCandleSource::new());
    seed_symbol(&source, "HYPEUSDT", 8);
    seed_symbol(&source, "BTCUSDT", 8);

    let orders = Arc::new(DryRunOrderSink::new());
    let store = Arc::new(AutoOrderStore::load(dir.path().join("auto_orders.json")).await);
    let tickers = vec![
        TickerCriteria::short_only("HYPEUSDT", ShortCriteria::default()),
        TickerCriteria::short_only("BTCUSDT", ShortCriteria::default()),
    ];
    let monitor = Monitor::new(
        source.clone(),
        pipeline_config(),
        tickers,
        orders.clone(),
        store,
    );

    Fixture {
        monitor,
        source,
        orders,
        _dir: dir,
    }
}

#[tokio::test]
async fn refresh_fills_table_and_detail() {
    let f = fixture().await;
    assert!(f.monitor.table_updated_at().await.is_none());

    f.monitor.refresh_tables().await;

    let table = f.monitor.table().await;
    assert_eq!(table.tickers, vec!["HYPEUSDT".to_string(), "BTCUSDT".to_string()]);
    assert!(table.updated_at.is_some());
    let rows = &table.data["HYPEUSDT"];
    // 8 candles, period 2
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].time, "2024-01-01 00:30");
    assert_eq!(rows[5].price, 8.0);

    let detail = f.monitor.detail("HYPEUSDT").await.unwrap();
    assert_eq!(detail.len(), 2);
    let newest_first = &detail[Timeframe::M15.as_str()];
    assert_eq!(newest_first[0].price, 8.0);
    assert!(newest_first[0].is_short);
    assert!(detail.contains_key(Timeframe::M1.as_str()));
}

#[tokio::test]
async fn failing_ticker_does_not_block_siblings() {
    let f = fixture().await;
    f.source.fail("BTCUSDT", Timeframe::M15);

    f.monitor.refresh_tables().await;

    let table = f.monitor.table().await;
    assert_eq!(table.data["HYPEUSDT"].len(), 6);
    assert!(table.data["BTCUSDT"].is_empty());
    let btc_detail = f.monitor.detail("BTCUSDT").await.unwrap();
    assert!(!btc_detail.contains_key(Timeframe::M15.as_str()));
    assert!(btc_detail.contains_key(Timeframe::M1.as_str()));
}

#[tokio::test]
async fn higher_timeframe_failure_only_mutes_its_ticker() {
    let f = fixture().await;
    f.source.fail("BTCUSDT", Timeframe::H4);
    f.monitor.auto_orders().toggle("HYPEUSDT").await.unwrap();
    f.monitor.auto_orders().toggle("BTCUSDT").await.unwrap();

    f.monitor.refresh_tables().await;

    let btc = f.monitor.detail("BTCUSDT").await.unwrap();
    let btc_rows = &btc[Timeframe::M15.as_str()];
    assert_eq!(btc_rows.len(), 6);
    assert!(btc_rows.iter().all(|r| r.rsi_4h.is_none() && !r.is_short));
    assert!(btc_rows.iter().all(|r| r.rsi_1h.is_some()));

    let hype = f.monitor.detail("HYPEUSDT").await.unwrap();
    let hype_rows = &hype[Timeframe::M15.as_str()];
    assert!(hype_rows.iter().all(|r| r.rsi_4h.is_some()));
    assert!(hype_rows[0].is_short);

    let placed = f.orders.placed();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].symbol, "HYPEUSDT");
}

#[tokio::test]
async fn auto_order_placed_once_per_signal() {
    let f = fixture().await;
    f.monitor.auto_orders().toggle("HYPEUSDT").await.unwrap();

    f.monitor.refresh_tables().await;
    f.monitor.refresh_tables().await;

    let placed = f.orders.placed();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].symbol, "HYPEUSDT");
    assert_eq!(placed[0].price, 8.0);
}

#[tokio::test]
async fn auto_order_requires_enablement() {
    let f = fixture().await;
    f.monitor.refresh_tables().await;
    assert!(f.orders.placed().is_empty());
}

#[tokio::test]
async fn dynamic_tickers_are_tracked_without_signals() {
    let f = fixture().await;
    seed_symbol(&f.source, "SOLUSDT", 8);

    let changes = f
        .monitor
        .set_dynamic_tickers(&["SOLUSDT".to_string(), "BTCUSDT".to_string()])
        .await;
    assert_eq!(changes.added, vec!["SOLUSDT".to_string()]);
    assert!(changes.removed.is_empty());

    f.monitor.refresh_tables().await;
    let detail = f.monitor.detail("SOLUSDT").await.unwrap();
    assert!(detail[Timeframe::M15.as_str()].iter().all(|r| !r.is_short));

    let changes = f.monitor.set_dynamic_tickers(&[]).await;
    assert_eq!(changes.removed, vec!["SOLUSDT".to_string()]);
    assert!(f.monitor.detail("SOLUSDT").await.is_none());
    assert_eq!(f.monitor.tickers().await.len(), 2);
}
