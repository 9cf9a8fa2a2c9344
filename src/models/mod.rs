//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod scan;
pub mod signal;
pub mod strategy;
pub mod timeframe;

pub use indicators::{Candle, RsiPoint};
pub use scan::{ExtremeThresholds, ScanOutcome, ScanSnapshot, ScanStatus, SymbolRsi};
pub use signal::AlignedRecord;
pub use strategy::{LongCriteria, ShortCriteria, TickerCriteria};
pub use timeframe::Timeframe;
