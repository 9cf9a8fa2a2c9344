//! Bybit market data over REST.

use crate::models::indicators::Candle;
use crate::models::timeframe::Timeframe;
use crate::services::bybit::messages::{Envelope, InstrumentsResult, KlineResult};
use crate::services::market_data::{validate_candles, CandleSource, FetchError, InstrumentSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const BYBIT_API_BASE_ENDPOINT: &str = "https://api.bybit.com";

/// Bybit caps kline requests at 1000 rows.
const MAX_KLINE_LIMIT: usize = 1000;
const INSTRUMENTS_PAGE_LIMIT: &str = "1000";
/// Safety stop for cursor pagination.
const MAX_INSTRUMENT_PAGES: usize = 20;

#[derive(Clone)]
pub struct BybitRestClient {
    http: Client,
    base_url: Url,
}

impl BybitRestClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(64)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Self::with_client(base_url, http)
    }

    pub fn with_client(base_url: &str, http: Client) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::Malformed(format!("invalid base url '{}': {}", base_url, e)))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let envelope: Envelope<T> = response.json().await?;
        if envelope.ret_code != 0 {
            return Err(FetchError::Api {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }
        envelope
            .result
            .ok_or_else(|| FetchError::Malformed("missing result".to_string()))
    }
}

/// Convert newest-first kline rows into ascending candles.
pub fn parse_kline_rows(rows: &[Vec<String>]) -> Result<Vec<Candle>, FetchError> {
    let mut candles = rows
        .iter()
        .map(|row| {
            if row.len() < 5 {
                return Err(FetchError::Malformed(format!(
                    "kline row has {} fields",
                    row.len()
                )));
            }
            let open_time_ms = row[0]
                .parse::<i64>()
                .map_err(|_| FetchError::Malformed(format!("bad start time '{}'", row[0])))?;
            let close = row[4]
                .parse::<f64>()
                .map_err(|_| FetchError::Malformed(format!("bad close '{}'", row[4])))?;
            Ok(Candle::new(open_time_ms, close))
        })
        .collect::<Result<Vec<Candle>, FetchError>>()?;
    candles.reverse();
    validate_candles(&candles)?;
    Ok(candles)
}

#[async_trait]
impl CandleSource for BybitRestClient {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        let limit = count.clamp(1, MAX_KLINE_LIMIT);
        let result: KlineResult = self
            .get_json(
                "/v5/market/index-price-kline",
                &[
                    ("category", "linear".to_string()),
                    ("symbol", symbol.to_string()),
                    ("interval", timeframe.exchange_code().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let candles = parse_kline_rows(&result.list)?;
        debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            count = candles.len(),
            "BybitRestClient: fetched {} candles for {} {}",
            candles.len(),
            symbol,
            timeframe
        );
        Ok(candles)
    }
}

#[async_trait]
impl InstrumentSource for BybitRestClient {
    async fn linear_symbols(&self) -> Result<Vec<String>, FetchError> {
        let mut symbols = Vec::new();
        let mut cursor = String::new();

        for _ in 0..MAX_INSTRUMENT_PAGES {
            let mut query = vec![
                ("category", "linear".to_string()),
                ("limit", INSTRUMENTS_PAGE_LIMIT.to_string()),
            ];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.clone()));
            }
            let page: InstrumentsResult = self.get_json("/v5/market/instruments-info", &query).await?;
            symbols.extend(
                page.list
                    .iter()
                    .filter(|i| i.is_trading_usdt_perpetual())
                    .map(|i| i.symbol.clone()),
            );
            if page.next_page_cursor.is_empty() {
                break;
            }
            cursor = page.next_page_cursor;
        }

        symbols.sort();
        symbols.dedup();
        debug!(count = symbols.len(), "BybitRestClient: {} linear symbols", symbols.len());
        Ok(symbols)
    }
}
