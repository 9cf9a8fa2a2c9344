//! Host-side monitor: refreshes the per-ticker tables, keeps the detail
//! views and dispatches automatic short orders.

pub mod registry;
pub mod views;

pub use registry::{TickerChanges, TickerRegistry};
pub use views::{detail_rows, table_rows, DetailRow, TableRow};

use crate::config::BASE_INTERVALS;
use crate::models::signal::AlignedRecord;
use crate::models::strategy::TickerCriteria;
use crate::models::timeframe::Timeframe;
use crate::services::market_data::CandleSource;
use crate::services::orders::{OrderReceipt, OrderSink, ShortOrder};
use crate::signals::pipeline::{MultiTimeframeSignalPipeline, PipelineConfig};
use crate::storage::AutoOrderStore;
use chrono::Local;
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

/// Interval whose newest record drives the table and auto-orders.
pub const TABLE_INTERVAL: Timeframe = Timeframe::M15;

pub type DetailView = BTreeMap<String, Vec<DetailRow>>;

#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub tickers: Vec<String>,
    pub data: BTreeMap<String, Vec<TableRow>>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Default)]
struct MonitorState {
    table: BTreeMap<String, Vec<TableRow>>,
    detail: BTreeMap<String, DetailView>,
    updated_at: Option<String>,
}

impl MonitorState {
    fn ensure(&mut self, symbol: &str) {
        self.table.entry(symbol.to_string()).or_default();
        self.detail.entry(symbol.to_string()).or_default();
    }

    fn forget(&mut self, symbol: &str) {
        self.table.remove(symbol);
        self.detail.remove(symbol);
    }
}

struct TickerRefresh {
    symbol: String,
    table: Option<Vec<TableRow>>,
    detail: Vec<(Timeframe, Vec<DetailRow>)>,
}

pub struct Monitor {
    pipeline: MultiTimeframeSignalPipeline,
    orders: Arc<dyn OrderSink>,
    auto_orders: Arc<AutoOrderStore>,
    intervals: Vec<(Timeframe, usize)>,
    registry: RwLock<TickerRegistry>,
    state: RwLock<MonitorState>,
    placed_keys: Mutex<HashSet<String>>,
}

impl Monitor {
    pub fn new(
        source: Arc<dyn CandleSource>,
        pipeline_config: PipelineConfig,
        tickers: Vec<TickerCriteria>,
        orders: Arc<dyn OrderSink>,
        auto_orders: Arc<AutoOrderStore>,
    ) -> Self {
        let registry = TickerRegistry::new(tickers);
        let mut state = MonitorState::default();
        for symbol in registry.symbols() {
            state.ensure(symbol);
        }
        Self {
            pipeline: MultiTimeframeSignalPipeline::with_config(source, pipeline_config),
            orders,
            auto_orders,
            intervals: BASE_INTERVALS.to_vec(),
            registry: RwLock::new(registry),
            state: RwLock::new(state),
            placed_keys: Mutex::new(HashSet::new()),
        }
    }

    /// Override the refreshed base intervals and their candle counts.
    pub fn with_intervals(mut self, intervals: Vec<(Timeframe, usize)>) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn auto_orders(&self) -> &Arc<AutoOrderStore> {
        &self.auto_orders
    }

    pub async fn tickers(&self) -> Vec<String> {
        self.registry.read().await.symbols().to_vec()
    }

    pub async fn contains(&self, symbol: &str) -> bool {
        self.registry.read().await.contains(symbol)
    }

    pub async fn table(&self) -> TableView {
        let tickers = self.tickers().await;
        let state = self.state.read().await;
        TableView {
            tickers,
            data: state.table.clone(),
            updated_at: state.updated_at.clone(),
        }
    }

    /// Detail view keyed by interval label, `None` for unknown tickers.
    pub async fn detail(&self, symbol: &str) -> Option<DetailView> {
        self.state.read().await.detail.get(symbol).cloned()
    }

    pub async fn table_updated_at(&self) -> Option<String> {
        self.state.read().await.updated_at.clone()
    }

    pub async fn set_dynamic_tickers(&self, symbols: &[String]) -> TickerChanges {
        let changes = self.registry.write().await.set_dynamic(symbols);
        {
            let mut state = self.state.write().await;
            for symbol in &changes.removed {
                state.forget(symbol);
            }
            for symbol in &changes.added {
                state.ensure(symbol);
            }
        }
        info!(
            added = ?changes.added,
            removed = ?changes.removed,
            "Monitor: dynamic tickers updated"
        );
        changes
    }

    /// Run the pipeline for every ticker and interval and publish the rows.
    ///
    /// Tickers refresh concurrently; a failing ticker/interval keeps its
    /// previous rows and does not affect the others.
    pub async fn refresh_tables(&self) {
        let tickers = self.tickers().await;
        debug!(count = tickers.len(), "Monitor: refreshing {} tickers", tickers.len());

        let results = join_all(tickers.iter().map(|symbol| self.refresh_ticker(symbol))).await;

        let registry = self.registry.read().await;
        let mut state = self.state.write().await;
        for refresh in results {
            if !registry.contains(&refresh.symbol) {
                continue;
            }
            state.ensure(&refresh.symbol);
            if let Some(rows) = refresh.table {
                state.table.insert(refresh.symbol.clone(), rows);
            }
            if let Some(detail) = state.detail.get_mut(&refresh.symbol) {
                for (timeframe, rows) in refresh.detail {
                    detail.insert(timeframe.as_str().to_string(), rows);
                }
            }
        }
        state.updated_at = Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    }

    async fn refresh_ticker(&self, symbol: &str) -> TickerRefresh {
        let (short, long) = self.registry.read().await.criteria(symbol);
        let mut refresh = TickerRefresh {
            symbol: symbol.to_string(),
            table: None,
            detail: Vec::with_capacity(self.intervals.len()),
        };

        for (timeframe, limit) in &self.intervals {
            let records = match self
                .pipeline
                .run(symbol, *timeframe, *limit, short.as_ref(), long.as_ref())
                .await
            {
                Ok(records) => records,
                Err(e) => {
                    error!(
                        symbol = %symbol,
                        timeframe = %timeframe,
                        error = %e,
                        "Monitor: refresh failed for {} {}",
                        symbol,
                        timeframe
                    );
                    continue;
                }
            };

            if *timeframe == TABLE_INTERVAL {
                refresh.table = Some(table_rows(&records));
                if let Some(latest) = records.last() {
                    self.dispatch_auto_order(symbol, latest).await;
                }
            }
            refresh.detail.push((*timeframe, detail_rows(&records)));
        }
        refresh
    }

    /// Place one short order per signal key when the newest record signals
    /// and auto-ordering is enabled for `symbol`. Failures are logged; the
    /// key stays consumed.
    pub async fn dispatch_auto_order(
        &self,
        symbol: &str,
        latest: &AlignedRecord,
    ) -> Option<OrderReceipt> {
        if !latest.is_short || !self.auto_orders.is_enabled(symbol).await {
            return None;
        }

        let key = latest.signal_key(symbol);
        if !self.placed_keys.lock().await.insert(key.clone()) {
            debug!(key = %key, "Monitor: order already placed for {}", key);
            return None;
        }

        let order = match ShortOrder::with_defaults(symbol, latest.price) {
            Ok(order) => order,
            Err(e) => {
                error!(symbol = %symbol, error = %e, "Monitor: cannot build order for {}", symbol);
                return None;
            }
        };

        match self.orders.place_short(&order).await {
            Ok(receipt) => {
                info!(
                    symbol = %symbol,
                    key = %key,
                    order_id = ?receipt.order_id,
                    dry_run = receipt.dry_run,
                    "Monitor: order placed for {}",
                    symbol
                );
                Some(receipt)
            }
            Err(e) => {
                error!(
                    symbol = %symbol,
                    key = %key,
                    error = %e,
                    "Monitor: order placement failed for {}",
                    symbol
                );
                None
            }
        }
    }
}
