//! Per-ticker signal criteria.
//!
//! Thresholds are strict: a short fires only when every RSI is *above* its
//! threshold, a long only when every RSI is *below* it. `price_precision` is
//! the number of decimals prices are rounded to before comparing against the
//! running day extremum, and should match the ticker's display precision.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PRICE_PRECISION: u32 = 5;

/// Criteria for a SHORT (overbought) signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortCriteria {
    /// Threshold for the base timeframe the pipeline runs on.
    pub rsi_base: f64,
    pub rsi_1h: f64,
    pub rsi_4h: f64,
    pub rsi_1d: f64,
    pub price_precision: u32,
    /// Require price to print above the running day high.
    pub use_day_high: bool,
}

impl Default for ShortCriteria {
    fn default() -> Self {
        Self {
            rsi_base: 50.0,
            rsi_1h: 60.0,
            rsi_4h: 70.0,
            rsi_1d: 70.0,
            price_precision: DEFAULT_PRICE_PRECISION,
            use_day_high: true,
        }
    }
}

impl ShortCriteria {
    pub fn new(rsi_base: f64, rsi_1h: f64, rsi_4h: f64, rsi_1d: f64) -> Self {
        Self {
            rsi_base,
            rsi_1h,
            rsi_4h,
            rsi_1d,
            ..Self::default()
        }
    }

    pub fn with_precision(mut self, price_precision: u32) -> Self {
        self.price_precision = price_precision;
        self
    }

    pub fn with_day_high(mut self, use_day_high: bool) -> Self {
        self.use_day_high = use_day_high;
        self
    }
}

/// Criteria for a LONG (oversold) signal. Mirror of [`ShortCriteria`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongCriteria {
    pub rsi_base: f64,
    pub rsi_1h: f64,
    pub rsi_4h: f64,
    pub rsi_1d: f64,
    pub price_precision: u32,
    /// Require price to print below the running day low.
    pub use_day_low: bool,
}

impl Default for LongCriteria {
    fn default() -> Self {
        Self {
            rsi_base: 50.0,
            rsi_1h: 40.0,
            rsi_4h: 30.0,
            rsi_1d: 30.0,
            price_precision: DEFAULT_PRICE_PRECISION,
            use_day_low: true,
        }
    }
}

impl LongCriteria {
    pub fn new(rsi_base: f64, rsi_1h: f64, rsi_4h: f64, rsi_1d: f64) -> Self {
        Self {
            rsi_base,
            rsi_1h,
            rsi_4h,
            rsi_1d,
            ..Self::default()
        }
    }

    pub fn with_precision(mut self, price_precision: u32) -> Self {
        self.price_precision = price_precision;
        self
    }

    pub fn with_day_low(mut self, use_day_low: bool) -> Self {
        self.use_day_low = use_day_low;
        self
    }
}

/// Criteria attached to one monitored ticker. Either side may be disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerCriteria {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<ShortCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<LongCriteria>,
}

impl TickerCriteria {
    pub fn short_only(symbol: impl Into<String>, short: ShortCriteria) -> Self {
        Self {
            symbol: symbol.into(),
            short: Some(short),
            long: None,
        }
    }

    pub fn with_long(mut self, long: LongCriteria) -> Self {
        self.long = Some(long);
        self
    }
}
