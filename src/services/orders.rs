//! Order placement boundary. The signal engine never places orders itself;
//! the host decides when to call an [`OrderSink`].

use crate::common::math::round_to;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::info;

pub const DEFAULT_NOTIONAL: f64 = 100.0;
pub const DEFAULT_LEVERAGE: u32 = 1;
/// Take-profit distance for a short (price falls), as a fraction.
pub const DEFAULT_TP_PCT: f64 = 0.02;
/// Stop-loss distance for a short (price rises), as a fraction.
pub const DEFAULT_SL_PCT: f64 = 0.10;

#[derive(Debug, Clone, PartialEq)]
pub enum OrderError {
    InvalidPrice(f64),
    MissingCredentials,
    Http(String),
    Rejected { code: i64, message: String },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::InvalidPrice(p) => write!(f, "invalid order price {}", p),
            OrderError::MissingCredentials => write!(f, "api credentials are not configured"),
            OrderError::Http(msg) => write!(f, "http error: {}", msg),
            OrderError::Rejected { code, message } => {
                write!(f, "order rejected ({}): {}", code, message)
            }
        }
    }
}

impl std::error::Error for OrderError {}

impl From<reqwest::Error> for OrderError {
    fn from(e: reqwest::Error) -> Self {
        OrderError::Http(e.to_string())
    }
}

/// A limit SELL with attached take-profit and stop-loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortOrder {
    pub symbol: String,
    pub price: f64,
    pub qty: String,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub notional: f64,
    pub leverage: u32,
}

impl ShortOrder {
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        tp_pct: f64,
        sl_pct: f64,
        notional: f64,
        leverage: u32,
    ) -> Result<Self, OrderError> {
        if !(price > 0.0) || !price.is_finite() {
            return Err(OrderError::InvalidPrice(price));
        }
        Ok(Self {
            symbol: symbol.into(),
            price,
            qty: calc_qty(price, notional),
            take_profit: round_to(price * (1.0 - tp_pct), 6),
            stop_loss: round_to(price * (1.0 + sl_pct), 6),
            notional,
            leverage,
        })
    }

    pub fn with_defaults(symbol: impl Into<String>, price: f64) -> Result<Self, OrderError> {
        Self::new(
            symbol,
            price,
            DEFAULT_TP_PCT,
            DEFAULT_SL_PCT,
            DEFAULT_NOTIONAL,
            DEFAULT_LEVERAGE,
        )
    }
}

/// Quantity string such that `qty * price` lands within ±10 % of `notional`,
/// using the fewest decimals (0..=4) that achieve it; 4 decimals otherwise.
pub fn calc_qty(price: f64, notional: f64) -> String {
    let raw = notional / price;
    for decimals in 0..5u32 {
        let q = round_to(raw, decimals);
        let value = q * price;
        if 0.9 * notional <= value && value <= 1.1 * notional {
            return format!("{:.*}", decimals as usize, q);
        }
    }
    format!("{:.4}", round_to(raw, 4))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub symbol: String,
    pub order_id: Option<String>,
    pub dry_run: bool,
}

#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn place_short(&self, order: &ShortOrder) -> Result<OrderReceipt, OrderError>;
}

/// Logs orders instead of sending them. Used when no credentials are configured.
#[derive(Default)]
pub struct DryRunOrderSink {
    placed: Mutex<Vec<ShortOrder>>,
}

impl DryRunOrderSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placed(&self) -> Vec<ShortOrder> {
        self.placed.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl OrderSink for DryRunOrderSink {
    async fn place_short(&self, order: &ShortOrder) -> Result<OrderReceipt, OrderError> {
        info!(
            symbol = %order.symbol,
            price = order.price,
            qty = %order.qty,
            take_profit = order.take_profit,
            stop_loss = order.stop_loss,
            "DryRunOrderSink: would place SHORT for {}",
            order.symbol
        );
        if let Ok(mut placed) = self.placed.lock() {
            placed.push(order.clone());
        }
        Ok(OrderReceipt {
            symbol: order.symbol.clone(),
            order_id: None,
            dry_run: true,
        })
    }
}
