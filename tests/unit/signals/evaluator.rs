//! Unit tests for the short/long criteria checks

use chrono::{FixedOffset, TimeZone};
use rsi_radar::models::signal::AlignedRecord;
use rsi_radar::models::strategy::{LongCriteria, ShortCriteria};
use rsi_radar::signals::SignalEvaluator;

fn record(price: f64, rsi_base: f64, higher: Option<(f64, f64, f64)>) -> AlignedRecord {
    let time = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .unwrap();
    let mut r = AlignedRecord::new(time, price, rsi_base);
    if let Some((h1, h4, d1)) = higher {
        r.rsi_1h = Some(h1);
        r.rsi_4h = Some(h4);
        r.rsi_1d = Some(d1);
    }
    r
}

#[test]
fn test_short_fires_above_all_thresholds() {
    let mut r = record(101.0, 55.0, Some((65.0, 75.0, 72.0)));
    r.day_high_so_far = Some(100.0);
    assert!(SignalEvaluator::is_short(&r, &ShortCriteria::default()));
}

#[test]
fn test_short_thresholds_are_strict() {
    let mut r = record(101.0, 50.0, Some((65.0, 75.0, 72.0)));
    r.day_high_so_far = Some(100.0);
    assert!(!SignalEvaluator::is_short(&r, &ShortCriteria::default()));
}

#[test]
fn test_short_requires_day_high_break_after_rounding() {
    // Equal at 5 decimals: not a break
    let mut r = record(100.000001, 55.0, Some((65.0, 75.0, 72.0)));
    r.day_high_so_far = Some(100.0);
    assert!(!SignalEvaluator::is_short(&r, &ShortCriteria::default()));

    // Coarser precision hides a larger difference too
    let mut r = record(100.04, 55.0, Some((65.0, 75.0, 72.0)));
    r.day_high_so_far = Some(100.0);
    let coarse = ShortCriteria::default().with_precision(1);
    assert!(!SignalEvaluator::is_short(&r, &coarse));
    assert!(SignalEvaluator::is_short(&r, &ShortCriteria::default()));
}

#[test]
fn test_short_without_prior_day_high_fails() {
    let r = record(101.0, 55.0, Some((65.0, 75.0, 72.0)));
    assert!(!SignalEvaluator::is_short(&r, &ShortCriteria::default()));
    let no_day = ShortCriteria::default().with_day_high(false);
    assert!(SignalEvaluator::is_short(&r, &no_day));
}

#[test]
fn test_missing_higher_rsi_never_signals() {
    let mut r = record(101.0, 55.0, Some((65.0, 75.0, 72.0)));
    r.rsi_4h = None;
    r.day_high_so_far = Some(100.0);
    r.day_low_so_far = Some(102.0);
    let short = ShortCriteria::default().with_day_high(false);
    let long = LongCriteria::new(99.0, 99.0, 99.0, 99.0).with_day_low(false);
    assert!(!SignalEvaluator::is_short(&r, &short));
    assert!(!SignalEvaluator::is_long(&r, &long));
}

#[test]
fn test_long_mirrors_short() {
    let mut r = record(95.0, 45.0, Some((35.0, 25.0, 20.0)));
    r.day_low_so_far = Some(96.0);
    assert!(SignalEvaluator::is_long(&r, &LongCriteria::default()));

    r.day_low_so_far = Some(95.0);
    assert!(!SignalEvaluator::is_long(&r, &LongCriteria::default()));
}

#[test]
fn test_short_and_long_are_independent() {
    let mut r = record(100.0, 55.0, Some((65.0, 75.0, 72.0)));
    let short = ShortCriteria::default().with_day_high(false);
    let long = LongCriteria::new(60.0, 70.0, 80.0, 80.0).with_day_low(false);
    r.day_high_so_far = None;
    assert!(SignalEvaluator::is_short(&r, &short));
    assert!(SignalEvaluator::is_long(&r, &long));
}
