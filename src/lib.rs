//! Multi-timeframe RSI signal engine and overbought scanner.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod scanner;
pub mod services;
pub mod signals;
pub mod storage;
