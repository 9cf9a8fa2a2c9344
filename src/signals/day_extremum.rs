//! Running per-day price extremes.

use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayRange {
    pub high: f64,
    pub low: f64,
}

/// Tracks the highest and lowest price seen so far on each calendar date.
///
/// [`DayExtremumTracker::observe`] hands back the range *before* the new price
/// is folded in, so a record is never compared against its own price.
#[derive(Debug, Clone, Default)]
pub struct DayExtremumTracker {
    days: BTreeMap<NaiveDate, DayRange>,
}

impl DayExtremumTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Range of prices already observed on `day`.
    pub fn prior(&self, day: NaiveDate) -> Option<DayRange> {
        self.days.get(&day).copied()
    }

    /// Return the range observed on `day` so far, then include `price` in it.
    pub fn observe(&mut self, day: NaiveDate, price: f64) -> Option<DayRange> {
        let prior = self.prior(day);
        self.days
            .entry(day)
            .and_modify(|range| {
                range.high = range.high.max(price);
                range.low = range.low.min(price);
            })
            .or_insert(DayRange {
                high: price,
                low: price,
            });
        prior
    }
}
