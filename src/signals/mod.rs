//! Signal evaluation: day extremes, criteria checks, profit annotation and the
//! multi-timeframe pipeline that composes them.

pub mod day_extremum;
pub mod evaluator;
pub mod pipeline;
pub mod profit;

pub use day_extremum::{DayExtremumTracker, DayRange};
pub use evaluator::SignalEvaluator;
pub use pipeline::{
    build_records, HigherAligners, MultiTimeframeSignalPipeline, PipelineConfig, PipelineError,
};
pub use profit::ProfitAnnotator;
