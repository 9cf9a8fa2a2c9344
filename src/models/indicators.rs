use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A price candle reduced to what the RSI pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time, epoch milliseconds.
    pub open_time_ms: i64,
    pub close: f64,
}

impl Candle {
    pub fn new(open_time_ms: i64, close: f64) -> Self {
        Self { open_time_ms, close }
    }

    pub fn open_time_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.open_time_ms)
    }

    /// Open time expressed in the given offset (used for calendar-day bucketing).
    pub fn open_time_in(&self, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
        offset.timestamp_millis_opt(self.open_time_ms).single()
    }

    /// Open time in the host's local zone, with the offset in effect at that instant.
    pub fn open_time_local(&self) -> Option<DateTime<FixedOffset>> {
        Local
            .timestamp_millis_opt(self.open_time_ms)
            .single()
            .map(|t| t.fixed_offset())
    }
}

/// One RSI reading, aligned to the index of the candle that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiPoint {
    pub index: usize,
    pub value: f64,
}
