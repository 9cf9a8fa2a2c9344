//! External collaborators: candle data, instrument listing and order placement.

pub mod bybit;
pub mod market_data;
pub mod memory;
pub mod orders;

pub use market_data::{CandleSource, FetchError, InstrumentSource};
pub use memory::InMemoryCandleSource;
pub use orders::{DryRunOrderSink, OrderError, OrderReceipt, OrderSink, ShortOrder};
