//! Resolve higher-timeframe RSI readings onto a base timeline.

use crate::models::indicators::{Candle, RsiPoint};

/// Sorted `open_time_ms -> rsi` lookup for one higher timeframe.
///
/// [`TimeframeAligner::value_at`] answers "which reading was in effect at T":
/// the reading of the last candle that opened at or before T.
#[derive(Debug, Clone, Default)]
pub struct TimeframeAligner {
    // Ascending by open time, unique timestamps.
    entries: Vec<(i64, f64)>,
}

impl TimeframeAligner {
    /// Build from the candles of a timeframe and the RSI points computed from them.
    /// Points whose index falls outside `candles` are ignored.
    pub fn new(candles: &[Candle], points: &[RsiPoint]) -> Self {
        Self::from_pairs(
            points
                .iter()
                .filter_map(|p| candles.get(p.index).map(|c| (c.open_time_ms, p.value))),
        )
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, f64)>,
    {
        let mut entries: Vec<(i64, f64)> = pairs.into_iter().collect();
        // Stable sort keeps input order among equal timestamps; the last one wins.
        entries.sort_by_key(|(ts, _)| *ts);
        let mut deduped: Vec<(i64, f64)> = Vec::with_capacity(entries.len());
        for (ts, value) in entries {
            match deduped.last_mut() {
                Some(last) if last.0 == ts => last.1 = value,
                _ => deduped.push((ts, value)),
            }
        }
        Self { entries: deduped }
    }

    /// An aligner with no data; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// RSI of the last entry with `open_time_ms <= timestamp_ms`, `None` if
    /// `timestamp_ms` precedes all entries.
    pub fn value_at(&self, timestamp_ms: i64) -> Option<f64> {
        let idx = self.entries.partition_point(|(ts, _)| *ts <= timestamp_ms);
        idx.checked_sub(1).map(|i| self.entries[i].1)
    }
}
