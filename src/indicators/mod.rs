//! Indicator calculations.

pub mod alignment;
pub mod error;
pub mod momentum;

pub use alignment::TimeframeAligner;
pub use error::IndicatorError;
pub use momentum::rsi::{latest_rsi, rsi_points, rsi_series, DEFAULT_RSI_PERIOD};
