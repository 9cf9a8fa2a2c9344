//! Concurrent latest-RSI scanner across many symbols.

pub mod overbought;

pub use overbought::{OverboughtScanner, ScanConfig, ScanGuard};
