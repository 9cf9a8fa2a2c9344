//! Bybit v5 response envelopes.

use serde::Deserialize;

/// Common `{retCode, retMsg, result}` envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "retCode")]
    pub ret_code: i64,
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    pub result: Option<T>,
}

/// Kline payload; rows are `[startTime, open, high, low, close, ...]`,
/// all strings, newest first.
#[derive(Debug, Deserialize)]
pub struct KlineResult {
    #[serde(default)]
    pub list: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct InstrumentsResult {
    #[serde(default)]
    pub list: Vec<InstrumentInfo>,
    #[serde(rename = "nextPageCursor", default)]
    pub next_page_cursor: String,
}

#[derive(Debug, Deserialize)]
pub struct InstrumentInfo {
    pub symbol: String,
    #[serde(rename = "contractType", default)]
    pub contract_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "quoteCoin", default)]
    pub quote_coin: String,
}

impl InstrumentInfo {
    pub fn is_trading_usdt_perpetual(&self) -> bool {
        self.status == "Trading" && self.contract_type == "LinearPerpetual" && self.quote_coin == "USDT"
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderCreated {
    #[serde(rename = "orderId", default)]
    pub order_id: String,
}
