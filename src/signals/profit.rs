//! Retrospective profit of flagged signals within one record batch.

use crate::common::math::{pct_change, round_to};
use crate::models::signal::AlignedRecord;

pub struct ProfitAnnotator;

impl ProfitAnnotator {
    /// Fill the profit fields of every flagged record.
    ///
    /// "Future" means the records strictly after the signal; the current price
    /// is the last record's price for the whole batch. Potential profit is
    /// `None` for the newest record since nothing follows it.
    pub fn annotate(records: &mut [AlignedRecord]) {
        let Some(current) = records.last().map(|r| r.price) else {
            return;
        };

        // future_min[i] / future_max[i] cover records[i + 1..].
        let n = records.len();
        let mut future_min: Vec<Option<f64>> = vec![None; n];
        let mut future_max: Vec<Option<f64>> = vec![None; n];
        for i in (0..n.saturating_sub(1)).rev() {
            let next = records[i + 1].price;
            future_min[i] = Some(future_min[i + 1].map_or(next, |m: f64| m.min(next)));
            future_max[i] = Some(future_max[i + 1].map_or(next, |m: f64| m.max(next)));
        }

        for (i, record) in records.iter_mut().enumerate() {
            if record.is_short {
                let (potential, now) = Self::short_profit(record.price, future_min[i], current);
                record.potential_profit_pct = potential;
                record.current_profit_pct = now;
            } else {
                record.potential_profit_pct = None;
                record.current_profit_pct = None;
            }

            if record.is_long {
                let (potential, now) = Self::long_profit(record.price, future_max[i], current);
                record.long_potential_profit_pct = potential;
                record.long_current_profit_pct = now;
            } else {
                record.long_potential_profit_pct = None;
                record.long_current_profit_pct = None;
            }
        }
    }

    /// Short: profit when price falls. Returns `(potential, current)` in percent.
    pub fn short_profit(
        signal_price: f64,
        future_min: Option<f64>,
        current_price: f64,
    ) -> (Option<f64>, Option<f64>) {
        let pct = |to: f64| pct_change(signal_price, to).map(|p| round_to(-p, 2));
        (future_min.and_then(pct), pct(current_price))
    }

    /// Long: profit when price rises. Returns `(potential, current)` in percent.
    pub fn long_profit(
        signal_price: f64,
        future_max: Option<f64>,
        current_price: f64,
    ) -> (Option<f64>, Option<f64>) {
        let pct = |to: f64| pct_change(signal_price, to).map(|p| round_to(p, 2));
        (future_max.and_then(pct), pct(current_price))
    }
}
