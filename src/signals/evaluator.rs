//! Composite overbought/oversold checks for one aligned record.

use crate::common::math::round_to;
use crate::models::signal::AlignedRecord;
use crate::models::strategy::{LongCriteria, ShortCriteria};

pub struct SignalEvaluator;

impl SignalEvaluator {
    /// True when (optionally) price breaks above the prior day high and every
    /// timeframe RSI is strictly above its threshold. A missing higher-timeframe
    /// reading always fails.
    pub fn is_short(record: &AlignedRecord, criteria: &ShortCriteria) -> bool {
        if criteria.use_day_high {
            let precision = criteria.price_precision;
            match record.day_high_so_far {
                Some(high) if round_to(record.price, precision) > round_to(high, precision) => {}
                _ => return false,
            }
        }

        let Some((rsi_1h, rsi_4h, rsi_1d)) = record.higher_rsi() else {
            return false;
        };

        record.rsi_base > criteria.rsi_base
            && rsi_1h > criteria.rsi_1h
            && rsi_4h > criteria.rsi_4h
            && rsi_1d > criteria.rsi_1d
    }

    /// Mirror of [`SignalEvaluator::is_short`]: break below the prior day low
    /// and every RSI strictly below its threshold.
    pub fn is_long(record: &AlignedRecord, criteria: &LongCriteria) -> bool {
        if criteria.use_day_low {
            let precision = criteria.price_precision;
            match record.day_low_so_far {
                Some(low) if round_to(record.price, precision) < round_to(low, precision) => {}
                _ => return false,
            }
        }

        let Some((rsi_1h, rsi_4h, rsi_1d)) = record.higher_rsi() else {
            return false;
        };

        record.rsi_base < criteria.rsi_base
            && rsi_1h < criteria.rsi_1h
            && rsi_4h < criteria.rsi_4h
            && rsi_1d < criteria.rsi_1d
    }
}
