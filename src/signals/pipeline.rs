//! Multi-timeframe signal pipeline for a single symbol.
//!
//! Fetch base + 1h/4h/1d candles, compute RSI per timeframe, then three
//! strictly ordered passes over the base timeline:
//! 1. materialize one record per base RSI point with aligned higher-timeframe readings,
//! 2. fold the day-extremum tracker and evaluate short/long criteria,
//! 3. annotate profits against the batch's last price.
//!
//! Output is oldest to newest.

use crate::indicators::alignment::TimeframeAligner;
use crate::indicators::error::IndicatorError;
use crate::indicators::momentum::rsi::{rsi_points, DEFAULT_RSI_PERIOD};
use crate::models::indicators::Candle;
use crate::models::signal::AlignedRecord;
use crate::models::strategy::{LongCriteria, ShortCriteria};
use crate::models::timeframe::Timeframe;
use crate::services::market_data::{CandleSource, FetchError};
use crate::signals::day_extremum::DayExtremumTracker;
use crate::signals::evaluator::SignalEvaluator;
use crate::signals::profit::ProfitAnnotator;
use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_HIGHER_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The base timeframe could not be fetched.
    Fetch {
        timeframe: Timeframe,
        source: FetchError,
    },
    Indicator(IndicatorError),
    InvalidTimestamp(i64),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Fetch { timeframe, source } => {
                write!(f, "failed to fetch {} candles: {}", timeframe, source)
            }
            PipelineError::Indicator(e) => write!(f, "indicator error: {}", e),
            PipelineError::InvalidTimestamp(ts) => write!(f, "invalid candle timestamp {}", ts),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Fetch { source, .. } => Some(source),
            PipelineError::Indicator(e) => Some(e),
            PipelineError::InvalidTimestamp(_) => None,
        }
    }
}

impl From<IndicatorError> for PipelineError {
    fn from(e: IndicatorError) -> Self {
        PipelineError::Indicator(e)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub period: usize,
    /// Candles requested for each higher timeframe.
    pub higher_limit: usize,
    /// Fixed offset for record times and calendar days. `None` uses the
    /// host's local time zone.
    pub day_offset: Option<FixedOffset>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_RSI_PERIOD,
            higher_limit: DEFAULT_HIGHER_LIMIT,
            day_offset: None,
        }
    }
}

impl PipelineConfig {
    /// Open time of `candle` in the configured zone.
    pub fn record_time(&self, candle: &Candle) -> Option<DateTime<FixedOffset>> {
        match &self.day_offset {
            Some(offset) => candle.open_time_in(offset),
            None => candle.open_time_local(),
        }
    }
}

/// Aligned lookups for the three higher timeframes.
#[derive(Debug, Clone, Default)]
pub struct HigherAligners {
    pub h1: TimeframeAligner,
    pub h4: TimeframeAligner,
    pub d1: TimeframeAligner,
}

impl HigherAligners {
    pub fn get(&self, timeframe: Timeframe) -> Option<&TimeframeAligner> {
        match timeframe {
            Timeframe::H1 => Some(&self.h1),
            Timeframe::H4 => Some(&self.h4),
            Timeframe::D1 => Some(&self.d1),
            Timeframe::M1 | Timeframe::M15 => None,
        }
    }

    fn set(&mut self, timeframe: Timeframe, aligner: TimeframeAligner) {
        match timeframe {
            Timeframe::H1 => self.h1 = aligner,
            Timeframe::H4 => self.h4 = aligner,
            Timeframe::D1 => self.d1 = aligner,
            Timeframe::M1 | Timeframe::M15 => {}
        }
    }
}

/// Pure part of the pipeline: everything after the candles are in memory.
///
/// Fails only when the base series is too short for `config.period`.
pub fn build_records(
    base: &[Candle],
    higher: &HigherAligners,
    config: &PipelineConfig,
    short: Option<&ShortCriteria>,
    long: Option<&LongCriteria>,
) -> Result<Vec<AlignedRecord>, PipelineError> {
    let points = rsi_points(base, config.period)?;

    // Pass 1: one record per base RSI point.
    let mut records = Vec::with_capacity(points.len());
    for point in &points {
        let candle = base[point.index];
        let time = config
            .record_time(&candle)
            .ok_or(PipelineError::InvalidTimestamp(candle.open_time_ms))?;
        let mut record = AlignedRecord::new(time, candle.close, point.value);
        record.rsi_1h = higher.h1.value_at(candle.open_time_ms);
        record.rsi_4h = higher.h4.value_at(candle.open_time_ms);
        record.rsi_1d = higher.d1.value_at(candle.open_time_ms);
        records.push(record);
    }

    // Pass 2: strict left-to-right fold over time.
    let mut tracker = DayExtremumTracker::new();
    for record in records.iter_mut() {
        let prior = tracker.observe(record.day(), record.price);
        record.day_high_so_far = prior.map(|r| r.high);
        record.day_low_so_far = prior.map(|r| r.low);
        record.is_short = short.is_some_and(|c| SignalEvaluator::is_short(record, c));
        record.is_long = long.is_some_and(|c| SignalEvaluator::is_long(record, c));
    }

    // Pass 3: profits need the complete, evaluated batch.
    ProfitAnnotator::annotate(&mut records);

    Ok(records)
}

pub struct MultiTimeframeSignalPipeline {
    source: Arc<dyn CandleSource>,
    config: PipelineConfig,
}

impl MultiTimeframeSignalPipeline {
    pub fn new(source: Arc<dyn CandleSource>) -> Self {
        Self::with_config(source, PipelineConfig::default())
    }

    pub fn with_config(source: Arc<dyn CandleSource>, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for `symbol` on the `base` timeframe.
    ///
    /// A base-timeframe fetch failure or too-short base history is an error.
    /// Higher-timeframe failures only produce alignment misses (and therefore
    /// no signals).
    pub async fn run(
        &self,
        symbol: &str,
        base: Timeframe,
        base_limit: usize,
        short: Option<&ShortCriteria>,
        long: Option<&LongCriteria>,
    ) -> Result<Vec<AlignedRecord>, PipelineError> {
        let limit = self.config.higher_limit;
        let (base_result, h1, h4, d1) = tokio::join!(
            self.source.fetch(symbol, base, base_limit),
            self.source.fetch(symbol, Timeframe::H1, limit),
            self.source.fetch(symbol, Timeframe::H4, limit),
            self.source.fetch(symbol, Timeframe::D1, limit),
        );

        let base_candles = base_result.map_err(|source| PipelineError::Fetch {
            timeframe: base,
            source,
        })?;

        let mut higher = HigherAligners::default();
        for (timeframe, result) in [(Timeframe::H1, h1), (Timeframe::H4, h4), (Timeframe::D1, d1)] {
            higher.set(timeframe, self.higher_aligner(symbol, timeframe, result));
        }

        let records = build_records(&base_candles, &higher, &self.config, short, long)?;
        debug!(
            symbol = %symbol,
            base = %base,
            records = records.len(),
            "Pipeline: built {} records for {} {}",
            records.len(),
            symbol,
            base
        );
        Ok(records)
    }

    fn higher_aligner(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        result: Result<Vec<Candle>, FetchError>,
    ) -> TimeframeAligner {
        let candles = match result {
            Ok(candles) => candles,
            Err(e) => {
                warn!(
                    symbol = %symbol,
                    timeframe = %timeframe,
                    error = %e,
                    "Pipeline: {} {} fetch failed, signals disabled for this batch",
                    symbol,
                    timeframe
                );
                return TimeframeAligner::empty();
            }
        };
        match rsi_points(&candles, self.config.period) {
            Ok(points) => TimeframeAligner::new(&candles, &points),
            Err(e) => {
                warn!(
                    symbol = %symbol,
                    timeframe = %timeframe,
                    error = %e,
                    "Pipeline: not enough {} history for {}",
                    timeframe,
                    symbol
                );
                TimeframeAligner::empty()
            }
        }
    }
}
