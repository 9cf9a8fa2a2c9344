//! Market data interfaces consumed by the pipeline and the scanner.

use crate::models::indicators::Candle;
use crate::models::timeframe::Timeframe;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, body read).
    Http(String),
    /// Non-success HTTP status.
    Status(u16),
    /// The exchange answered with a non-zero return code.
    Api { code: i64, message: String },
    /// Response could not be decoded or broke the candle ordering contract.
    Malformed(String),
    /// No data for the requested symbol/timeframe.
    Unavailable(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(msg) => write!(f, "http error: {}", msg),
            FetchError::Status(code) => write!(f, "unexpected status {}", code),
            FetchError::Api { code, message } => write!(f, "api error {}: {}", code, message),
            FetchError::Malformed(msg) => write!(f, "malformed response: {}", msg),
            FetchError::Unavailable(msg) => write!(f, "unavailable: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

/// Supplies candles ordered oldest to newest, unique open times, positive closes.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, FetchError>;
}

/// Lists tradable symbols for venue-wide scans.
#[async_trait]
pub trait InstrumentSource: Send + Sync {
    async fn linear_symbols(&self) -> Result<Vec<String>, FetchError>;
}

/// Check the ordering contract of a candle batch.
pub fn validate_candles(candles: &[Candle]) -> Result<(), FetchError> {
    if let Some(pair) = candles
        .windows(2)
        .find(|pair| pair[1].open_time_ms <= pair[0].open_time_ms)
    {
        return Err(FetchError::Malformed(format!(
            "candles not strictly ascending at {} -> {}",
            pair[0].open_time_ms, pair[1].open_time_ms
        )));
    }
    if let Some(bad) = candles.iter().find(|c| !(c.close > 0.0) || !c.close.is_finite()) {
        return Err(FetchError::Malformed(format!(
            "non-positive close {} at {}",
            bad.close, bad.open_time_ms
        )));
    }
    Ok(())
}
