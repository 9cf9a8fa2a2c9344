//! Unit tests for RSI

use rsi_radar::indicators::{latest_rsi, rsi_points, rsi_series, IndicatorError};
use rsi_radar::models::indicators::Candle;

fn candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| Candle::new(i as i64 * 60_000, *c))
        .collect()
}

/// +7 / -2 alternating: average gain 3.5, average loss 1.0 over 14 deltas.
fn seesaw() -> Vec<f64> {
    let mut prices = vec![100.0];
    for i in 0..14 {
        let last = *prices.last().unwrap();
        prices.push(if i % 2 == 0 { last + 7.0 } else { last - 2.0 });
    }
    prices
}

#[test]
fn test_rsi_seed_value() {
    let prices = seesaw();
    assert_eq!(prices.len(), 15);
    let values = rsi_series(&prices, 14).unwrap();
    assert_eq!(values.len(), 1);
    // RS = 3.5 -> 100 - 100 / 4.5
    assert!((values[0] - 77.77777777777777).abs() < 1e-9);
}

#[test]
fn test_rsi_fifteen_price_reference_series() {
    let prices = [
        10.0, 10.5, 10.2, 10.8, 11.0, 10.9, 11.3, 11.1, 11.5, 11.8, 11.6, 12.0, 12.3, 12.1, 12.5,
    ];
    let values = rsi_series(&prices, 14).unwrap();
    assert_eq!(values.len(), 1);
    // gains sum to 3.5, losses to 1.0
    assert!((values[0] - 77.77777777777777).abs() < 1e-9);
    assert_eq!(latest_rsi(&candles(&prices), 14), Some(77.78));
}

#[test]
fn test_rsi_wilder_smoothing_step() {
    let mut prices = seesaw();
    let last = *prices.last().unwrap();
    prices.push(last - 5.0);
    let values = rsi_series(&prices, 14).unwrap();
    assert_eq!(values.len(), 2);
    let avg_gain = 3.5 * 13.0 / 14.0;
    let avg_loss = (1.0 * 13.0 + 5.0) / 14.0;
    let expected = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
    assert!((values[1] - expected).abs() < 1e-9);
}

#[test]
fn test_rsi_insufficient_data() {
    let prices: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
    assert_eq!(
        rsi_series(&prices, 14),
        Err(IndicatorError::InsufficientData {
            required: 15,
            actual: 14
        })
    );
    assert_eq!(latest_rsi(&candles(&prices), 14), None);
}

#[test]
fn test_rsi_zero_period_rejected() {
    assert_eq!(
        rsi_series(&[1.0, 2.0], 0),
        Err(IndicatorError::InvalidPeriod(0))
    );
}

#[test]
fn test_rsi_monotonic_rise_is_100() {
    let prices: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
    let values = rsi_series(&prices, 14).unwrap();
    assert!(values.iter().all(|v| *v == 100.0));
}

#[test]
fn test_rsi_flat_prices_is_100() {
    let prices = vec![5.0; 20];
    let values = rsi_series(&prices, 14).unwrap();
    assert!(values.iter().all(|v| *v == 100.0));
}

#[test]
fn test_rsi_monotonic_fall_is_0() {
    let prices: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
    let values = rsi_series(&prices, 14).unwrap();
    assert!(values.iter().all(|v| v.abs() < 1e-12));
}

#[test]
fn test_rsi_values_stay_in_bounds() {
    let prices: Vec<f64> = (0..200)
        .map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0 + (i as f64 * 0.13).cos() * 3.0)
        .collect();
    let values = rsi_series(&prices, 14).unwrap();
    assert_eq!(values.len(), 186);
    assert!(values.iter().all(|v| (0.0..=100.0).contains(v)));
}

#[test]
fn test_rsi_points_carry_candle_index() {
    let data = candles(&seesaw());
    let points = rsi_points(&data, 14).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].index, 14);
}

#[test]
fn test_latest_rsi_rounds() {
    assert_eq!(latest_rsi(&candles(&seesaw()), 14), Some(77.78));
}
