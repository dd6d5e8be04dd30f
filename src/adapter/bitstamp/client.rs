//! Bitstamp REST client: trade feed and reference rate.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, warn};

use super::dto::{Ticker, Transaction};
use crate::adapter::http;
use crate::domain::{ExchangeId, Trade};
use crate::error::{FetchError, Result};
use crate::port::{RateSource, TradeSource};

/// Public API root.
pub const DEFAULT_API_URL: &str = "https://www.bitstamp.net/api/v2";

/// Recent fills for one Bitstamp book, e.g. `xrpusd`.
pub struct BitstampTradeSource {
    client: Client,
    api_url: String,
    exchange: ExchangeId,
    pair: String,
}

impl BitstampTradeSource {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        exchange: ExchangeId,
        pair: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http::client(timeout)?,
            api_url: api_url.into(),
            exchange,
            pair: pair.into(),
        })
    }
}

#[async_trait]
impl TradeSource for BitstampTradeSource {
    fn exchange(&self) -> &ExchangeId {
        &self.exchange
    }

    async fn fetch_trades(&self, since: DateTime<Utc>) -> Result<Vec<Trade>> {
        let mut url = http::endpoint(&self.api_url, &format!("transactions/{}/", self.pair))?;
        url.query_pairs_mut().append_pair("time", "hour");

        let transactions: Vec<Transaction> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| FetchError::Trades {
                exchange: self.exchange.clone(),
                reason: e.to_string(),
            })?
            .json()
            .await?;

        let mut trades = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            match transaction.into_trade(&self.exchange) {
                Ok(trade) if trade.timestamp > since => trades.push(trade),
                Ok(_) => {}
                Err(e) => warn!(exchange = %self.exchange, error = %e, "Skipping malformed fill"),
            }
        }

        debug!(
            exchange = %self.exchange,
            pair = %self.pair,
            trades = trades.len(),
            "Bitstamp fills"
        );
        Ok(trades)
    }
}

/// Reference rate from the last traded price of one Bitstamp book.
pub struct BitstampRateSource {
    client: Client,
    api_url: String,
    pair: String,
}

impl BitstampRateSource {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        pair: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http::client(timeout)?,
            api_url: api_url.into(),
            pair: pair.into(),
        })
    }
}

#[async_trait]
impl RateSource for BitstampRateSource {
    async fn reference_rate(&self) -> Result<f64> {
        let url = http::endpoint(&self.api_url, &format!("ticker/{}/", self.pair))?;

        let ticker: Ticker = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| FetchError::Rate(e.to_string()))?
            .json()
            .await?;

        ticker
            .last_price()
            .map_err(|e| FetchError::Rate(e.to_string()).into())
    }
}
