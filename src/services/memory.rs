//! In-memory candle source for tests, demos and dry runs.

use crate::models::indicators::Candle;
use crate::models::timeframe::Timeframe;
use crate::services::market_data::{validate_candles, CandleSource, FetchError, InstrumentSource};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

type SeriesKey = (String, Timeframe);

/// Serves preloaded candle series and counts every fetch it answers.
///
/// Individual symbol/timeframe pairs can be marked as failing, and an
/// artificial latency can be set to exercise concurrency.
#[derive(Default)]
pub struct InMemoryCandleSource {
    series: RwLock<HashMap<SeriesKey, Vec<Candle>>>,
    failing: RwLock<HashSet<SeriesKey>>,
    latency: Option<Duration>,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemoryCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) {
        if let Ok(mut series) = self.series.write() {
            series.insert((symbol.to_string(), timeframe), candles);
        }
    }

    /// Build evenly spaced candles from closes, starting at `start_ms`.
    pub fn insert_closes(&self, symbol: &str, timeframe: Timeframe, start_ms: i64, closes: &[f64]) {
        let step = timeframe.to_millis();
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, close)| Candle::new(start_ms + i as i64 * step, *close))
            .collect();
        self.insert(symbol, timeframe, candles);
    }

    pub fn fail(&self, symbol: &str, timeframe: Timeframe) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert((symbol.to_string(), timeframe));
        }
    }

    /// Total number of fetches served (including failed ones).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Highest number of fetches observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lookup(&self, key: &SeriesKey, count: usize) -> Result<Vec<Candle>, FetchError> {
        let failing = self
            .failing
            .read()
            .map_err(|_| FetchError::Unavailable("lock poisoned".to_string()))?;
        if failing.contains(key) {
            return Err(FetchError::Http(format!("injected failure for {} {}", key.0, key.1)));
        }
        let series = self
            .series
            .read()
            .map_err(|_| FetchError::Unavailable("lock poisoned".to_string()))?;
        let candles = series
            .get(key)
            .ok_or_else(|| FetchError::Unavailable(format!("no candles for {} {}", key.0, key.1)))?;
        let start = candles.len().saturating_sub(count);
        let out = candles[start..].to_vec();
        validate_candles(&out)?;
        Ok(out)
    }
}

#[async_trait]
impl CandleSource for InMemoryCandleSource {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let result = self.lookup(&(symbol.to_string(), timeframe), count);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl InstrumentSource for InMemoryCandleSource {
    async fn linear_symbols(&self) -> Result<Vec<String>, FetchError> {
        let series = self
            .series
            .read()
            .map_err(|_| FetchError::Unavailable("lock poisoned".to_string()))?;
        let mut symbols: Vec<String> = series.keys().map(|(s, _)| s.clone()).collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}
