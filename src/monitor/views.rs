//! Display rows derived from pipeline records.

use crate::common::math::round_to;
use crate::models::signal::AlignedRecord;
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Compact 15-minute row shown in the ticker table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub time: String,
    pub price: f64,
    pub rsi: f64,
}

impl From<&AlignedRecord> for TableRow {
    fn from(record: &AlignedRecord) -> Self {
        Self {
            time: record.time.format(TIME_FORMAT).to_string(),
            price: record.price,
            rsi: round_to(record.rsi_base, 2),
        }
    }
}

/// Full record for the detail view. RSI readings are rounded to 2 places,
/// day extremes to 5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub time: String,
    pub price: f64,
    pub rsi: f64,
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

impl From<&AlignedRecord> for DetailRow {
    fn from(r: &AlignedRecord) -> Self {
        let rsi = |v: Option<f64>| v.map(|v| round_to(v, 2));
        let price = |v: Option<f64>| v.map(|v| round_to(v, 5));
        Self {
            time: r.time.format(TIME_FORMAT).to_string(),
            price: r.price,
            rsi: round_to(r.rsi_base, 2),
            rsi_1h: rsi(r.rsi_1h),
            rsi_4h: rsi(r.rsi_4h),
            rsi_1d: rsi(r.rsi_1d),
            day_high_so_far: price(r.day_high_so_far),
            day_low_so_far: price(r.day_low_so_far),
            is_short: r.is_short,
            is_long: r.is_long,
            potential_profit_pct: r.potential_profit_pct,
            current_profit_pct: r.current_profit_pct,
            long_potential_profit_pct: r.long_potential_profit_pct,
            long_current_profit_pct: r.long_current_profit_pct,
        }
    }
}

/// Table rows, oldest first.
pub fn table_rows(records: &[AlignedRecord]) -> Vec<TableRow> {
    records.iter().map(TableRow::from).collect()
}

/// Detail rows, newest first.
pub fn detail_rows(records: &[AlignedRecord]) -> Vec<DetailRow> {
    records.iter().rev().map(DetailRow::from).collect()
}
