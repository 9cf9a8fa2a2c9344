//! Signed order placement on Bybit v5.

use crate::services::bybit::client::BybitRestClient;
use crate::services::bybit::messages::{Envelope, OrderCreated};
use crate::services::orders::{OrderError, OrderReceipt, OrderSink, ShortOrder};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use tracing::{debug, info};

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_RECV_WINDOW_MS: u64 = 5000;

#[derive(Clone)]
pub struct BybitCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub recv_window_ms: u64,
}

impl BybitCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
        }
    }
}

impl std::fmt::Debug for BybitCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BybitCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("recv_window_ms", &self.recv_window_ms)
            .finish()
    }
}

/// HMAC-SHA256 signature of `timestamp + api_key + recv_window + payload`, hex encoded.
pub fn sign_payload(
    credentials: &BybitCredentials,
    timestamp_ms: i64,
    payload: &str,
) -> Result<String, OrderError> {
    let mut mac = HmacSha256::new_from_slice(credentials.api_secret.as_bytes())
        .map_err(|_| OrderError::MissingCredentials)?;
    mac.update(timestamp_ms.to_string().as_bytes());
    mac.update(credentials.api_key.as_bytes());
    mac.update(credentials.recv_window_ms.to_string().as_bytes());
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

pub struct BybitOrderSink {
    client: BybitRestClient,
    credentials: BybitCredentials,
}

impl BybitOrderSink {
    pub fn new(client: BybitRestClient, credentials: BybitCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    async fn post_signed<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, OrderError> {
        let url = self
            .client
            .base_url()
            .join(path)
            .map_err(|e| OrderError::Http(e.to_string()))?;
        let payload = body.to_string();
        let timestamp = chrono::Utc::now().timestamp_millis();
        let signature = sign_payload(&self.credentials, timestamp, &payload)?;

        let response = self
            .client
            .http()
            .post(url)
            .header("X-BAPI-API-KEY", &self.credentials.api_key)
            .header("X-BAPI-TIMESTAMP", timestamp.to_string())
            .header("X-BAPI-RECV-WINDOW", self.credentials.recv_window_ms.to_string())
            .header("X-BAPI-SIGN", signature)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrderError::Http(format!("unexpected status {}", status)));
        }
        let envelope: Envelope<T> = response.json().await?;
        if envelope.ret_code != 0 {
            return Err(OrderError::Rejected {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }
        envelope.result.ok_or_else(|| OrderError::Rejected {
            code: 0,
            message: "missing result".to_string(),
        })
    }

    async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<(), OrderError> {
        let body = json!({
            "category": "linear",
            "symbol": symbol,
            "buyLeverage": leverage.to_string(),
            "sellLeverage": leverage.to_string(),
        });
        self.post_signed::<Value>("/v5/position/set-leverage", &body)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl OrderSink for BybitOrderSink {
    async fn place_short(&self, order: &ShortOrder) -> Result<OrderReceipt, OrderError> {
        // "leverage not modified" comes back as an error; it is harmless.
        if let Err(e) = self.set_leverage(&order.symbol, order.leverage).await {
            debug!(symbol = %order.symbol, leverage = order.leverage, error = %e, "set_leverage failed");
        }

        info!(
            symbol = %order.symbol,
            price = order.price,
            qty = %order.qty,
            notional = order.notional,
            leverage = order.leverage,
            take_profit = order.take_profit,
            stop_loss = order.stop_loss,
            "Placing SHORT order for {}",
            order.symbol
        );

        let body = json!({
            "category": "linear",
            "symbol": order.symbol,
            "isLeverage": 1,
            "side": "Sell",
            "orderType": "Limit",
            "orderFilter": "Order",
            "price": order.price.to_string(),
            "qty": order.qty,
            "takeProfit": order.take_profit.to_string(),
            "stopLoss": order.stop_loss.to_string(),
        });
        let created: OrderCreated = self.post_signed("/v5/order/create", &body).await?;
        info!(symbol = %order.symbol, order_id = %created.order_id, "place_order accepted");

        Ok(OrderReceipt {
            symbol: order.symbol.clone(),
            order_id: Some(created.order_id),
            dry_run: false,
        })
    }
}
