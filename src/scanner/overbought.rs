use crate::core::runtime::{WorkerPool, DEFAULT_POOL_SIZE};
use crate::indicators::momentum::rsi::{latest_rsi, DEFAULT_RSI_PERIOD};
use crate::models::scan::{ScanOutcome, ScanSnapshot, ScanStatus, SymbolRsi};
use crate::models::timeframe::Timeframe;
use crate::services::market_data::{CandleSource, FetchError, InstrumentSource};
use chrono::Utc;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_INFLIGHT: usize = 30;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub period: usize,
    /// Candles requested per symbol and timeframe.
    pub candle_limit: usize,
    pub cache_ttl: Duration,
    pub pool_size: usize,
    /// Cap on fetches in flight across all symbols.
    pub max_inflight: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_RSI_PERIOD,
            candle_limit: DEFAULT_RSI_PERIOD + 5,
            cache_ttl: DEFAULT_CACHE_TTL,
            pool_size: DEFAULT_POOL_SIZE,
            max_inflight: DEFAULT_MAX_INFLIGHT,
        }
    }
}

impl ScanConfig {
    /// Set the RSI period; the candle limit follows it.
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self.candle_limit = period + 5;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    pub fn with_max_inflight(mut self, max_inflight: usize) -> Self {
        self.max_inflight = max_inflight;
        self
    }
}

/// Held for the duration of one scan. Dropping it (normally, on error or
/// on panic unwind) returns the scanner to idle.
pub struct ScanGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

struct CacheState {
    snapshot: Arc<ScanSnapshot>,
    refreshed_at: Option<Instant>,
}

/// Single-flight, TTL-cached scanner of the latest RSI per symbol on all
/// five timeframes.
///
/// Fetches run on a dedicated [`WorkerPool`] and are admitted through a
/// semaphore sized by `max_inflight`, independently of the pool size.
pub struct OverboughtScanner {
    source: Arc<dyn CandleSource>,
    config: ScanConfig,
    pool: WorkerPool,
    inflight: Arc<Semaphore>,
    scanning: Arc<AtomicBool>,
    cache: RwLock<CacheState>,
}

impl OverboughtScanner {
    pub fn new(source: Arc<dyn CandleSource>, config: ScanConfig) -> io::Result<Self> {
        let pool = WorkerPool::new(config.pool_size)?;
        let inflight = Arc::new(Semaphore::new(config.max_inflight.max(1)));

        info!(
            period = config.period,
            ttl_secs = config.cache_ttl.as_secs(),
            max_inflight = config.max_inflight,
            "OverboughtScanner: created"
        );

        Ok(Self {
            source,
            config,
            pool,
            inflight,
            scanning: Arc::new(AtomicBool::new(false)),
            cache: RwLock::new(CacheState {
                snapshot: Arc::new(ScanSnapshot::empty()),
                refreshed_at: None,
            }),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    pub fn status(&self) -> ScanStatus {
        if self.is_scanning() {
            ScanStatus::Scanning
        } else {
            ScanStatus::Idle
        }
    }

    /// Latest published snapshot. Empty until the first scan completes.
    pub fn snapshot(&self) -> Arc<ScanSnapshot> {
        match self.cache.read() {
            Ok(cache) => cache.snapshot.clone(),
            Err(poisoned) => poisoned.into_inner().snapshot.clone(),
        }
    }

    /// True when a non-empty snapshot was published within the TTL.
    pub fn is_cache_fresh(&self) -> bool {
        let cache = match self.cache.read() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        !cache.snapshot.is_empty()
            && cache
                .refreshed_at
                .is_some_and(|at| at.elapsed() < self.config.cache_ttl)
    }

    /// True once any scan has completed.
    pub fn has_scanned(&self) -> bool {
        match self.cache.read() {
            Ok(cache) => cache.refreshed_at.is_some(),
            Err(poisoned) => poisoned.into_inner().refreshed_at.is_some(),
        }
    }

    /// Claim the scanner for one scan.
    ///
    /// Returns `Err(Busy)` while another scan holds it and `Err(Cached)`
    /// while the last snapshot is within the TTL. Neither case changes state.
    pub fn try_begin(&self) -> Result<ScanGuard, ScanOutcome> {
        if self.is_scanning() {
            debug!("OverboughtScanner: scan already in progress");
            return Err(ScanOutcome::Busy);
        }
        if self.is_cache_fresh() {
            debug!("OverboughtScanner: serving cached snapshot");
            return Err(ScanOutcome::Cached(self.snapshot()));
        }
        if self
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("OverboughtScanner: scan already in progress");
            return Err(ScanOutcome::Busy);
        }
        let guard = ScanGuard {
            flag: self.scanning.clone(),
        };
        // A scan may have published between the freshness check and the claim.
        if self.is_cache_fresh() {
            debug!("OverboughtScanner: serving cached snapshot");
            return Err(ScanOutcome::Cached(self.snapshot()));
        }
        Ok(guard)
    }

    /// Scan `symbols`, or return the cached/busy outcome without fetching.
    pub async fn scan(&self, symbols: &[String]) -> ScanOutcome {
        match self.try_begin() {
            Ok(guard) => ScanOutcome::Completed(self.run(guard, symbols).await),
            Err(outcome) => outcome,
        }
    }

    /// Scan every trading symbol listed by `instruments`.
    ///
    /// The listing only happens once the scanner has been claimed, so busy
    /// and cached requests cost no network calls.
    pub async fn scan_all(
        &self,
        instruments: &dyn InstrumentSource,
    ) -> Result<ScanOutcome, FetchError> {
        let guard = match self.try_begin() {
            Ok(guard) => guard,
            Err(outcome) => return Ok(outcome),
        };
        let symbols = instruments.linear_symbols().await?;
        Ok(ScanOutcome::Completed(self.run(guard, &symbols).await))
    }

    /// Fan out over `symbols` and publish the resulting snapshot.
    ///
    /// Consumes the guard, so the scanner is idle again when this returns.
    pub async fn run(&self, guard: ScanGuard, symbols: &[String]) -> Arc<ScanSnapshot> {
        let started = Instant::now();
        info!(
            symbols = symbols.len(),
            "OverboughtScanner: scanning {} symbols",
            symbols.len()
        );

        let rows = join_all(symbols.iter().map(|symbol| self.scan_symbol(symbol))).await;
        let entries: BTreeMap<String, SymbolRsi> = rows.into_iter().collect();
        let snapshot = Arc::new(ScanSnapshot::new(entries, Utc::now()));
        self.publish(snapshot.clone());

        info!(
            symbols = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "OverboughtScanner: scan completed for {} symbols",
            snapshot.len()
        );
        drop(guard);
        snapshot
    }

    fn publish(&self, snapshot: Arc<ScanSnapshot>) {
        let mut cache = match self.cache.write() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        *cache = CacheState {
            snapshot,
            refreshed_at: Some(Instant::now()),
        };
    }

    async fn scan_symbol(&self, symbol: &str) -> (String, SymbolRsi) {
        let readings = join_all(
            Timeframe::ALL
                .iter()
                .map(|timeframe| self.fetch_latest(symbol, *timeframe)),
        )
        .await;

        let mut row = SymbolRsi::default();
        for (timeframe, value) in Timeframe::ALL.iter().zip(readings) {
            row.set(*timeframe, value);
        }
        (symbol.to_string(), row)
    }

    async fn fetch_latest(&self, symbol: &str, timeframe: Timeframe) -> Option<f64> {
        let permit = self.inflight.clone().acquire_owned().await.ok()?;
        let source = self.source.clone();
        let owned_symbol = symbol.to_string();
        let limit = self.config.candle_limit;
        let period = self.config.period;

        let handle = self.pool.spawn(async move {
            let _permit = permit;
            source
                .fetch(&owned_symbol, timeframe, limit)
                .await
                .map(|candles| latest_rsi(&candles, period))
        })?;

        match handle.await {
            Ok(Ok(value)) => {
                if value.is_none() {
                    debug!(
                        symbol = %symbol,
                        timeframe = %timeframe,
                        "OverboughtScanner: not enough history for {} {}",
                        symbol,
                        timeframe
                    );
                }
                value
            }
            Ok(Err(e)) => {
                debug!(
                    symbol = %symbol,
                    timeframe = %timeframe,
                    error = %e,
                    "OverboughtScanner: fetch failed for {} {}",
                    symbol,
                    timeframe
                );
                None
            }
            Err(e) => {
                debug!(
                    symbol = %symbol,
                    timeframe = %timeframe,
                    error = %e,
                    "OverboughtScanner: fetch task aborted for {} {}",
                    symbol,
                    timeframe
                );
                None
            }
        }
    }
}
