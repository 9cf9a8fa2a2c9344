//! Candle timeframes understood by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    /// Every timeframe, finest first.
    pub const ALL: [Timeframe; 5] = [
        Timeframe::M1,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    /// Higher timeframes aligned onto a base series by the pipeline.
    pub const HIGHER: [Timeframe; 3] = [Timeframe::H1, Timeframe::H4, Timeframe::D1];

    pub fn to_minutes(&self) -> u64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M15 => 15,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        }
    }

    pub fn to_millis(&self) -> i64 {
        self.to_minutes() as i64 * 60_000
    }

    /// Interval code used by the Bybit v5 kline endpoints.
    pub fn exchange_code(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1",
            Timeframe::M15 => "15",
            Timeframe::H1 => "60",
            Timeframe::H4 => "240",
            Timeframe::D1 => "D",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    /// Accepts both display labels ("15m") and exchange codes ("15").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" | "1" => Ok(Timeframe::M1),
            "15m" | "15" => Ok(Timeframe::M15),
            "1h" | "60" => Ok(Timeframe::H1),
            "4h" | "240" => Ok(Timeframe::H4),
            "1d" | "D" => Ok(Timeframe::D1),
            other => Err(format!("unknown timeframe '{}'", other)),
        }
    }
}
