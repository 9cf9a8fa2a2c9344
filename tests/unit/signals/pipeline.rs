//! Unit tests for the multi-timeframe signal pipeline

use chrono::{FixedOffset, Local, Offset, TimeZone, Utc};
use rsi_radar::indicators::{IndicatorError, TimeframeAligner};
use rsi_radar::models::indicators::Candle;
use rsi_radar::models::strategy::{LongCriteria, ShortCriteria};
use rsi_radar::models::timeframe::Timeframe;
use rsi_radar::services::market_data::FetchError;
use rsi_radar::services::memory::InMemoryCandleSource;
use rsi_radar::signals::{
    build_records, HigherAligners, MultiTimeframeSignalPipeline, PipelineConfig, PipelineError,
};
use std::sync::Arc;

const MINUTE: i64 = 60_000;

fn config() -> PipelineConfig {
    PipelineConfig {
        period: 2,
        day_offset: Some(Utc.fix()),
        ..PipelineConfig::default()
    }
}

fn day_start() -> i64 {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .unwrap()
        .timestamp_millis()
}

fn base_candles(start_ms: i64, closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| Candle::new(start_ms + i as i64 * 15 * MINUTE, *c))
        .collect()
}

fn hot_higher() -> HigherAligners {
    let hot = TimeframeAligner::from_pairs(vec![(0, 80.0)]);
    HigherAligners {
        h1: hot.clone(),
        h4: hot.clone(),
        d1: hot,
    }
}

#[test]
fn test_records_follow_base_rsi_points() {
    let base = base_candles(day_start(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let records = build_records(&base, &hot_higher(), &config(), None, None).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].price, 3.0);
    assert_eq!(records[0].time.timestamp_millis(), base[2].open_time_ms);
    assert_eq!(records[3].rsi_1d, Some(80.0));
    // no criteria, no signals
    assert!(records.iter().all(|r| !r.is_short && !r.is_long));
}

#[test]
fn test_short_signals_and_profits() {
    let base = base_candles(day_start(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let short = ShortCriteria::default();
    let records = build_records(&base, &hot_higher(), &config(), Some(&short), None).unwrap();

    let flags: Vec<bool> = records.iter().map(|r| r.is_short).collect();
    // first record of the day has nothing to break
    assert_eq!(flags, vec![false, true, true, true]);
    assert_eq!(records[0].day_high_so_far, None);
    assert_eq!(records[1].day_high_so_far, Some(3.0));

    // price 4, future minimum 5, last price 6
    assert_eq!(records[1].potential_profit_pct, Some(-25.0));
    assert_eq!(records[1].current_profit_pct, Some(-50.0));
    // newest record has no future
    assert_eq!(records[3].potential_profit_pct, None);
    assert_eq!(records[3].current_profit_pct, Some(0.0));
    assert_eq!(records[0].potential_profit_pct, None);
}

#[test]
fn test_day_extremum_resets_at_midnight() {
    let start = day_start() - 45 * MINUTE; // 23:15 on the previous day
    let base = base_candles(start, &[1.0, 2.0, 3.0, 4.0, 5.0]);
    let short = ShortCriteria::default();
    let records = build_records(&base, &hot_higher(), &config(), Some(&short), None).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].time.format("%H:%M").to_string(), "23:45");
    assert_eq!(records[0].day_high_so_far, None);
    assert_eq!(records[1].time.format("%H:%M").to_string(), "00:00");
    assert_eq!(records[1].day_high_so_far, None);
    assert!(!records[1].is_short);
    assert_eq!(records[2].day_high_so_far, Some(4.0));
    assert!(records[2].is_short);
}

#[test]
fn test_day_extremum_resets_at_local_midnight() {
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let start = day_start() + 13 * 60 * MINUTE + 30 * MINUTE; // 22:30 +09:00
    let base = base_candles(start, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    let local = PipelineConfig {
        day_offset: Some(tokyo),
        ..config()
    };
    let records = build_records(&base, &hot_higher(), &local, None, None).unwrap();

    assert_eq!(records[4].time.format("%Y-%m-%d %H:%M").to_string(), "2024-01-02 00:00");
    assert_eq!(records[4].day_high_so_far, None);
    assert_eq!(records[5].day_high_so_far, Some(7.0));

    // same candles bucketed in UTC stay on one day
    let utc = build_records(&base, &hot_higher(), &config(), None, None).unwrap();
    assert_eq!(utc[4].day_high_so_far, Some(6.0));
}

#[test]
fn test_default_config_uses_host_local_time() {
    let default_config = PipelineConfig {
        period: 2,
        ..PipelineConfig::default()
    };
    assert!(default_config.day_offset.is_none());

    let base = base_candles(day_start(), &[1.0, 2.0, 3.0, 4.0]);
    let records = build_records(&base, &hot_higher(), &default_config, None, None).unwrap();
    let expected = Local
        .timestamp_millis_opt(base[2].open_time_ms)
        .unwrap()
        .fixed_offset();
    assert_eq!(records[0].time, expected);
    assert_eq!(records[0].time.offset().fix(), expected.offset().fix());
    assert_eq!(records[0].day(), expected.date_naive());
}

#[test]
fn test_long_signals_and_profits() {
    let base = base_candles(day_start(), &[6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
    let cold = TimeframeAligner::from_pairs(vec![(0, 20.0)]);
    let higher = HigherAligners {
        h1: cold.clone(),
        h4: cold.clone(),
        d1: cold,
    };
    let short = ShortCriteria::default();
    let long = LongCriteria::default();
    let records = build_records(&base, &higher, &config(), Some(&short), Some(&long)).unwrap();

    let flags: Vec<bool> = records.iter().map(|r| r.is_long).collect();
    assert_eq!(flags, vec![false, true, true, true]);
    assert!(records.iter().all(|r| !r.is_short && r.potential_profit_pct.is_none()));
    assert_eq!(records[0].day_low_so_far, None);
    assert_eq!(records[1].day_low_so_far, Some(4.0));
    assert_eq!(records[2].day_low_so_far, Some(3.0));

    // price 3, future maximum 2, last price 1
    assert_eq!(records[1].long_potential_profit_pct, Some(-33.33));
    assert_eq!(records[1].long_current_profit_pct, Some(-66.67));
    assert_eq!(records[3].long_potential_profit_pct, None);
    assert_eq!(records[3].long_current_profit_pct, Some(0.0));
    assert_eq!(records[0].long_current_profit_pct, None);
}

#[test]
fn test_alignment_miss_disables_signals() {
    let base = base_candles(day_start(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let mut higher = hot_higher();
    higher.h4 = TimeframeAligner::from_pairs(vec![(day_start() + 365 * 24 * 60 * MINUTE, 90.0)]);
    let short = ShortCriteria::default();
    let records = build_records(&base, &higher, &config(), Some(&short), None).unwrap();
    assert!(records.iter().all(|r| r.rsi_4h.is_none() && !r.is_short));
}

#[test]
fn test_build_is_idempotent() {
    let base = base_candles(day_start(), &[1.0, 2.0, 1.5, 3.0, 2.5, 4.0, 3.5]);
    let short = ShortCriteria::default();
    let a = build_records(&base, &hot_higher(), &config(), Some(&short), None).unwrap();
    let b = build_records(&base, &hot_higher(), &config(), Some(&short), None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_short_base_history_is_an_error() {
    let base = base_candles(day_start(), &[1.0, 2.0]);
    let err = build_records(&base, &hot_higher(), &config(), None, None).unwrap_err();
    assert_eq!(
        err,
        PipelineError::Indicator(IndicatorError::InsufficientData {
            required: 3,
            actual: 2
        })
    );
}

fn seeded_source() -> InMemoryCandleSource {
    let source = InMemoryCandleSource::new();
    let start = day_start();
    let rising: Vec<f64> = (1..=10).map(|i| i as f64).collect();
    source.insert_closes("HYPEUSDT", Timeframe::M15, start, &rising[..6]);
    source.insert_closes("HYPEUSDT", Timeframe::H1, start - 10 * Timeframe::H1.to_millis(), &rising);
    source.insert_closes("HYPEUSDT", Timeframe::H4, start - 10 * Timeframe::H4.to_millis(), &rising);
    source.insert_closes("HYPEUSDT", Timeframe::D1, start - 10 * Timeframe::D1.to_millis(), &rising);
    source
}

#[tokio::test]
async fn test_pipeline_run_fetches_and_signals() {
    let source = Arc::new(seeded_source());
    let pipeline = MultiTimeframeSignalPipeline::with_config(source.clone(), config());
    let short = ShortCriteria::default();

    let records = pipeline
        .run("HYPEUSDT", Timeframe::M15, 110, Some(&short), None)
        .await
        .unwrap();

    assert_eq!(source.fetch_count(), 4);
    assert_eq!(records.len(), 4);
    assert_eq!(records[1].rsi_1h, Some(100.0));
    assert!(records[3].is_short);
}

#[tokio::test]
async fn test_pipeline_higher_failure_degrades() {
    let source = seeded_source();
    source.fail("HYPEUSDT", Timeframe::D1);
    let pipeline = MultiTimeframeSignalPipeline::with_config(Arc::new(source), config());
    let short = ShortCriteria::default();

    let records = pipeline
        .run("HYPEUSDT", Timeframe::M15, 110, Some(&short), None)
        .await
        .unwrap();

    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.rsi_1d.is_none() && !r.is_short));
    assert!(records.iter().all(|r| r.rsi_1h.is_some()));
}

#[tokio::test]
async fn test_pipeline_base_failure_propagates() {
    let source = seeded_source();
    source.fail("HYPEUSDT", Timeframe::M15);
    let pipeline = MultiTimeframeSignalPipeline::with_config(Arc::new(source), config());

    let err = pipeline
        .run("HYPEUSDT", Timeframe::M15, 110, None, None)
        .await
        .unwrap_err();
    match err {
        PipelineError::Fetch { timeframe, source } => {
            assert_eq!(timeframe, Timeframe::M15);
            assert!(matches!(source, FetchError::Http(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
