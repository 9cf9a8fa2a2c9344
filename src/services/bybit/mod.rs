//! Bybit v5 REST integration.

pub mod client;
pub mod messages;
pub mod orders;

pub use client::{BybitRestClient, BYBIT_API_BASE_ENDPOINT};
pub use orders::{BybitCredentials, BybitOrderSink};
