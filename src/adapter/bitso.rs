//! Bitso trade feed.
//!
//! `GET {api_url}/trades/?book={book}` returns the most recent fills. The
//! reported side is the maker's, so a maker `sell` is a taker buy of the
//! bridge asset.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapter::http;
use crate::domain::{ExchangeId, Trade, TradeDirection};
use crate::error::{Error, FetchError, Result};
use crate::port::TradeSource;

/// Public API root.
pub const DEFAULT_API_URL: &str = "https://api.bitso.com/v3";

const PAGE_LIMIT: &str = "100";

#[derive(Debug, Deserialize)]
struct TradesResponse {
    success: bool,
    #[serde(default)]
    payload: Vec<BitsoTrade>,
}

#[derive(Debug, Deserialize)]
struct BitsoTrade {
    /// e.g. `2019-01-01T00:00:10+0000`
    created_at: String,
    amount: String,
    price: String,
    maker_side: String,
    tid: u64,
}

impl BitsoTrade {
    fn into_trade(self, exchange: &ExchangeId) -> Result<Trade> {
        let timestamp = DateTime::parse_from_str(&self.created_at, "%Y-%m-%dT%H:%M:%S%z")
            .map_err(|e| Error::Parse(format!("created_at {}: {e}", self.created_at)))?
            .with_timezone(&Utc);
        let direction = match self.maker_side.as_str() {
            "sell" => TradeDirection::FiatToBridge,
            "buy" => TradeDirection::BridgeToFiat,
            other => return Err(Error::Parse(format!("maker_side {other}"))),
        };
        let number = |field: &str, value: &str| {
            value
                .parse::<f64>()
                .map_err(|_| Error::Parse(format!("{field}: {value}")))
        };

        Ok(Trade {
            amount: number("amount", &self.amount)?,
            rate: number("price", &self.price)?,
            timestamp,
            order_id: self.tid.to_string(),
            exchange: exchange.clone(),
            direction,
        })
    }
}

/// Recent fills for one Bitso book, e.g. `xrp_mxn`.
pub struct BitsoTradeSource {
    client: Client,
    api_url: String,
    exchange: ExchangeId,
    book: String,
}

impl BitsoTradeSource {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        exchange: ExchangeId,
        book: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http::client(timeout)?,
            api_url: api_url.into(),
            exchange,
            book: book.into(),
        })
    }
}

#[async_trait]
impl TradeSource for BitsoTradeSource {
    fn exchange(&self) -> &ExchangeId {
        &self.exchange
    }

    async fn fetch_trades(&self, since: DateTime<Utc>) -> Result<Vec<Trade>> {
        let mut url = http::endpoint(&self.api_url, "trades/")?;
        url.query_pairs_mut()
            .append_pair("book", &self.book)
            .append_pair("limit", PAGE_LIMIT);

        let response: TradesResponse = self.client.get(url).send().await?.json().await?;
        if !response.success {
            return Err(FetchError::Trades {
                exchange: self.exchange.clone(),
                reason: "success=false".to_string(),
            }
            .into());
        }

        let mut trades = Vec::with_capacity(response.payload.len());
        for raw in response.payload {
            match raw.into_trade(&self.exchange) {
                Ok(trade) if trade.timestamp > since => trades.push(trade),
                Ok(_) => {}
                Err(e) => warn!(exchange = %self.exchange, error = %e, "Skipping malformed fill"),
            }
        }

        debug!(exchange = %self.exchange, book = %self.book, trades = trades.len(), "Bitso fills");
        Ok(trades)
    }
}
