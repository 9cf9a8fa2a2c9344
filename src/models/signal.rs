use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// One base-timeframe candle after RSI warm-up, with the higher-timeframe
/// readings in effect at its open time and the evaluated signals.
///
/// Optional RSI fields are `None` on an alignment miss; profit fields are
/// `None` unless the corresponding signal fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub time: DateTime<FixedOffset>,
    pub price: f64,
    pub rsi_base: f64,
    pub rsi_1h: Option<f64>,
    pub rsi_4h: Option<f64>,
    pub rsi_1d: Option<f64>,
    pub day_high_so_far: Option<f64>,
    pub day_low_so_far: Option<f64>,
    pub is_short: bool,
    pub is_long: bool,
    pub potential_profit_pct: Option<f64>,
    pub current_profit_pct: Option<f64>,
    pub long_potential_profit_pct: Option<f64>,
    pub long_current_profit_pct: Option<f64>,
}

impl AlignedRecord {
    pub fn new(time: DateTime<FixedOffset>, price: f64, rsi_base: f64) -> Self {
        Self {
            time,
            price,
            rsi_base,
            rsi_1h: None,
            rsi_4h: None,
            rsi_1d: None,
            day_high_so_far: None,
            day_low_so_far: None,
            is_short: false,
            is_long: false,
            potential_profit_pct: None,
            current_profit_pct: None,
            long_potential_profit_pct: None,
            long_current_profit_pct: None,
        }
    }

    /// Calendar date of the record in its own offset.
    pub fn day(&self) -> NaiveDate {
        self.time.date_naive()
    }

    /// All three higher-timeframe readings, or `None` if any is missing.
    pub fn higher_rsi(&self) -> Option<(f64, f64, f64)> {
        Some((self.rsi_1h?, self.rsi_4h?, self.rsi_1d?))
    }

    /// Signal key used to de-duplicate order placement.
    pub fn signal_key(&self, symbol: &str) -> String {
        format!("{}:{}", symbol, self.time.format("%Y-%m-%d %H:%M"))
    }
}
