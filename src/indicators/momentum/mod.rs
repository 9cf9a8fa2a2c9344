pub mod rsi;

pub use rsi::*;
