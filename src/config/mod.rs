//! Environment-driven settings and the default ticker tables.

use crate::models::strategy::{ShortCriteria, TickerCriteria};
use crate::models::timeframe::Timeframe;
use crate::scanner::ScanConfig;
use crate::services::bybit::{BybitCredentials, BYBIT_API_BASE_ENDPOINT};
use crate::storage::DEFAULT_STATE_PATH;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 60;

/// Symbols monitored out of the box, in display order.
pub const DEFAULT_TICKERS: [&str; 5] = ["HYPEUSDT", "BTCUSDT", "VVVUSDT", "BTRUSDT", "PIPPINUSDT"];

/// Base intervals refreshed by the monitor and the candle count fetched for each.
pub const BASE_INTERVALS: [(Timeframe, usize); 2] = [(Timeframe::M1, 1000), (Timeframe::M15, 110)];

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// `APP_ENV`, default `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn is_production() -> bool {
    matches!(get_environment().as_str(), "production" | "prod")
}

pub fn get_port() -> u16 {
    parse_var("PORT").unwrap_or(DEFAULT_PORT)
}

pub fn get_bybit_base_url() -> String {
    env::var("BYBIT_BASE_URL").unwrap_or_else(|_| BYBIT_API_BASE_ENDPOINT.to_string())
}

/// Both `BYBIT_API_KEY` and `BYBIT_API_SECRET` must be set and non-empty.
pub fn get_bybit_credentials() -> Option<BybitCredentials> {
    let key = env::var("BYBIT_API_KEY").ok().filter(|k| !k.is_empty())?;
    let secret = env::var("BYBIT_API_SECRET").ok().filter(|s| !s.is_empty())?;
    Some(BybitCredentials::new(key, secret))
}

pub fn get_refresh_interval_seconds() -> u64 {
    parse_var("REFRESH_INTERVAL_SECONDS").unwrap_or(DEFAULT_REFRESH_INTERVAL_SECONDS)
}

pub fn get_auto_order_state_path() -> PathBuf {
    env::var("AUTO_ORDER_STATE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH))
}

pub fn get_rsi_period() -> usize {
    parse_var::<usize>("RSI_PERIOD")
        .filter(|p| *p > 0)
        .unwrap_or(crate::indicators::DEFAULT_RSI_PERIOD)
}

/// Scanner settings from `RSI_PERIOD`, `SCAN_CACHE_TTL_SECONDS`,
/// `SCAN_POOL_SIZE` and `SCAN_MAX_INFLIGHT`.
pub fn get_scan_config() -> ScanConfig {
    let defaults = ScanConfig::default();
    let ttl = parse_var("SCAN_CACHE_TTL_SECONDS")
        .map(Duration::from_secs)
        .unwrap_or(defaults.cache_ttl);
    ScanConfig::default()
        .with_period(get_rsi_period())
        .with_cache_ttl(ttl)
        .with_pool_size(parse_var("SCAN_POOL_SIZE").unwrap_or(defaults.pool_size))
        .with_max_inflight(parse_var("SCAN_MAX_INFLIGHT").unwrap_or(defaults.max_inflight))
}

/// Default ticker table: short criteria only, long signals are opt-in.
pub fn default_tickers() -> Vec<TickerCriteria> {
    DEFAULT_TICKERS
        .iter()
        .map(|symbol| TickerCriteria::short_only(*symbol, ShortCriteria::new(50.0, 60.0, 70.0, 70.0)))
        .collect()
}
