//! RSI (Relative Strength Index) with Wilder's smoothing

use crate::common::math::round_to;
use crate::indicators::error::IndicatorError;
use crate::models::indicators::{Candle, RsiPoint};

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Calculate the RSI series for a sequence of closing prices.
///
/// Returns `prices.len() - period` values; the first one belongs to
/// `prices[period]`. The averages are seeded with a simple mean over the first
/// `period` deltas and then smoothed with `avg = (avg * (period - 1) + x) / period`.
///
/// RSI = 100 - (100 / (1 + avg_gain / avg_loss)), and exactly 100 when
/// `avg_loss` is zero.
pub fn rsi_series(prices: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }
    if prices.len() < period + 1 {
        return Err(IndicatorError::InsufficientData {
            required: period + 1,
            actual: prices.len(),
        });
    }

    let (gains, losses) = gains_and_losses(prices);
    let p = period as f64;

    let mut avg_gain = gains[..period].iter().sum::<f64>() / p;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / p;

    let mut values = Vec::with_capacity(prices.len() - period);
    values.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
        values.push(rsi_from_averages(avg_gain, avg_loss));
    }

    Ok(values)
}

/// RSI series over candle closes, each point tagged with its candle index.
pub fn rsi_points(candles: &[Candle], period: usize) -> Result<Vec<RsiPoint>, IndicatorError> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let values = rsi_series(&closes, period)?;
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(i, value)| RsiPoint {
            index: period + i,
            value,
        })
        .collect())
}

/// Most recent RSI reading rounded to 2 decimals, or `None` without enough history.
pub fn latest_rsi(candles: &[Candle], period: usize) -> Option<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    rsi_series(&closes, period)
        .ok()?
        .last()
        .map(|v| round_to(*v, 2))
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}

/// Split consecutive close deltas into gains and (positive) losses.
fn gains_and_losses(prices: &[f64]) -> (Vec<f64>, Vec<f64>) {
    prices
        .windows(2)
        .map(|pair| {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                (delta, 0.0)
            } else {
                (0.0, -delta)
            }
        })
        .unzip()
}
