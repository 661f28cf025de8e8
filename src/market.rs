//! Market data source: OHLCV bars over HTTP.

use crate::bars::{Bar, BarSeries};
use crate::error::FeedError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Supplier of bars for one symbol over an interval/lookback window.
#[async_trait]
pub trait BarFeed: Send + Sync {
    async fn fetch(&self, symbol: &str, interval: &str, limit: u32)
    -> Result<BarSeries, FeedError>;
}

/// Kline endpoint client. Every failure is reported to the caller; the
/// scan layer decides to degrade, never this one. No retry, no backoff.
pub struct HttpBarFeed {
    client: Client,
    base_url: String,
}

impl HttpBarFeed {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BarFeed for HttpBarFeed {
    async fn fetch(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<BarSeries, FeedError> {
        let url = format!("{}/klines", self.base_url);
        let limit = limit.to_string();
        let query = [
            ("symbol", symbol),
            ("interval", interval),
            ("limit", limit.as_str()),
        ];

        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if status.as_u16() == 418 || status.as_u16() == 429 {
            return Err(FeedError::RateLimited);
        }
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        // Kline payloads are arrays of positional arrays. Rows that fail
        // lenient decoding are dropped rather than failing the fetch.
        let raw_klines: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))?;

        let bars: Vec<Bar> = raw_klines
            .iter()
            .filter_map(|row| Bar::from_kline_row(row))
            .collect();

        Ok(BarSeries::from_bars(symbol, bars))
    }
}
