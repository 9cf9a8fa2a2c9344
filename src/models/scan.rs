//! Overbought scanner snapshot types.

use crate::models::timeframe::Timeframe;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Latest RSI reading per timeframe for one symbol. `None` means the fetch
/// failed or there was not enough history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolRsi {
    pub rsi_1d: Option<f64>,
    pub rsi_4h: Option<f64>,
    pub rsi_1h: Option<f64>,
    pub rsi_15m: Option<f64>,
    pub rsi_1m: Option<f64>,
}

impl SymbolRsi {
    pub fn get(&self, timeframe: Timeframe) -> Option<f64> {
        match timeframe {
            Timeframe::D1 => self.rsi_1d,
            Timeframe::H4 => self.rsi_4h,
            Timeframe::H1 => self.rsi_1h,
            Timeframe::M15 => self.rsi_15m,
            Timeframe::M1 => self.rsi_1m,
        }
    }

    pub fn set(&mut self, timeframe: Timeframe, value: Option<f64>) {
        let slot = match timeframe {
            Timeframe::D1 => &mut self.rsi_1d,
            Timeframe::H4 => &mut self.rsi_4h,
            Timeframe::H1 => &mut self.rsi_1h,
            Timeframe::M15 => &mut self.rsi_15m,
            Timeframe::M1 => &mut self.rsi_1m,
        };
        *slot = value;
    }
}

/// Optional per-timeframe thresholds used to filter a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtremeThresholds {
    pub rsi_1d: Option<f64>,
    pub rsi_4h: Option<f64>,
    pub rsi_1h: Option<f64>,
    pub rsi_15m: Option<f64>,
    pub rsi_1m: Option<f64>,
}

impl ExtremeThresholds {
    fn pairs(&self) -> [(Timeframe, Option<f64>); 5] {
        [
            (Timeframe::D1, self.rsi_1d),
            (Timeframe::H4, self.rsi_4h),
            (Timeframe::H1, self.rsi_1h),
            (Timeframe::M15, self.rsi_15m),
            (Timeframe::M1, self.rsi_1m),
        ]
    }
}

/// Result of one completed scan. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub entries: BTreeMap<String, SymbolRsi>,
    pub captured_at: DateTime<Utc>,
}

impl ScanSnapshot {
    pub fn new(entries: BTreeMap<String, SymbolRsi>, captured_at: DateTime<Utc>) -> Self {
        Self {
            entries,
            captured_at,
        }
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new(), DateTime::<Utc>::default())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolRsi> {
        self.entries.get(symbol)
    }

    /// Capture time as shown to users, in local time.
    pub fn updated_at(&self) -> String {
        self.captured_at
            .with_timezone(&Local)
            .format("%H:%M:%S %d.%m.%Y")
            .to_string()
    }

    /// Symbols whose readings are strictly above every configured threshold.
    /// A missing reading never passes a configured threshold.
    pub fn overbought(&self, thresholds: &ExtremeThresholds) -> Vec<String> {
        self.filter(thresholds, |value, threshold| value > threshold)
    }

    /// Symbols whose readings are strictly below every configured threshold.
    pub fn oversold(&self, thresholds: &ExtremeThresholds) -> Vec<String> {
        self.filter(thresholds, |value, threshold| value < threshold)
    }

    fn filter<F>(&self, thresholds: &ExtremeThresholds, passes: F) -> Vec<String>
    where
        F: Fn(f64, f64) -> bool,
    {
        let pairs = thresholds.pairs();
        self.entries
            .iter()
            .filter(|(_, rsi)| {
                pairs.iter().all(|(tf, threshold)| match threshold {
                    Some(t) => rsi.get(*tf).is_some_and(|v| passes(v, *t)),
                    None => true,
                })
            })
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Idle,
    Scanning,
}

/// What a scan request resolved to.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// A fresh scan ran and its snapshot was published.
    Completed(Arc<ScanSnapshot>),
    /// The cached snapshot is still within its TTL; nothing was fetched.
    Cached(Arc<ScanSnapshot>),
    /// Another scan is in flight; the request was rejected.
    Busy,
}

impl ScanOutcome {
    pub fn snapshot(&self) -> Option<&Arc<ScanSnapshot>> {
        match self {
            ScanOutcome::Completed(s) | ScanOutcome::Cached(s) => Some(s),
            ScanOutcome::Busy => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanOutcome::Completed(_) => "completed",
            ScanOutcome::Cached(_) => "cached",
            ScanOutcome::Busy => "busy",
        }
    }
}
