//! Bitstamp API v2 response types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{ExchangeId, Trade, TradeDirection};
use crate::error::{Error, Result};

/// Bitstamp returns some numeric fields as strings and others as numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Lenient {
    Number(i64),
    Text(String),
}

impl Lenient {
    fn as_i64(&self, field: &str) -> Result<i64> {
        match self {
            Lenient::Number(n) => Ok(*n),
            Lenient::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::Parse(format!("{field}: {s}"))),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Lenient::Number(n) => n.to_string(),
            Lenient::Text(s) => s.clone(),
        }
    }
}

/// One fill from `GET /transactions/{pair}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    /// Unix seconds.
    pub date: Lenient,
    pub tid: Lenient,
    pub price: String,
    pub amount: String,
    /// `0` when the taker bought, `1` when the taker sold.
    #[serde(rename = "type")]
    pub kind: Lenient,
}

impl Transaction {
    /// Convert to a domain trade for `exchange`.
    ///
    /// # Errors
    /// Returns a parse error for malformed numbers or an unknown type.
    pub fn into_trade(self, exchange: &ExchangeId) -> Result<Trade> {
        let secs = self.date.as_i64("date")?;
        let timestamp = DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| Error::Parse(format!("date out of range: {secs}")))?;
        let direction = match self.kind.as_i64("type")? {
            0 => TradeDirection::FiatToBridge,
            1 => TradeDirection::BridgeToFiat,
            other => return Err(Error::Parse(format!("unknown transaction type {other}"))),
        };

        Ok(Trade {
            amount: parse_number("amount", &self.amount)?,
            rate: parse_number("price", &self.price)?,
            timestamp,
            order_id: self.tid.to_text(),
            exchange: exchange.clone(),
            direction,
        })
    }
}

/// `GET /ticker/{pair}/`, only the fields used.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    pub last: String,
}

impl Ticker {
    /// Last traded price.
    ///
    /// # Errors
    /// Returns a parse error if the price is not a positive number.
    pub fn last_price(&self) -> Result<f64> {
        let price = parse_number("last", &self.last)?;
        if price > 0.0 {
            Ok(price)
        } else {
            Err(Error::Parse(format!("non-positive last price {price}")))
        }
    }
}

fn parse_number(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Parse(format!("{field}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taker_side_to_direction() {
        let body = r#"[
            {"date": "1546300810", "tid": "81000001", "price": "0.35",
             "amount": "1000.0", "type": "0"},
            {"date": 1546300811, "tid": 81000002, "price": "0.35", "amount": "250.5", "type": 1}
        ]"#;
        let transactions: Vec<Transaction> = serde_json::from_str(body).unwrap();
        let exchange = ExchangeId::from("bitstamp-usd");
        let trades: Vec<Trade> = transactions
            .into_iter()
            .map(|t| t.into_trade(&exchange).unwrap())
            .collect();

        assert_eq!(trades[0].direction, TradeDirection::FiatToBridge);
        assert_eq!(trades[0].order_id, "81000001");
        assert_eq!(trades[0].timestamp.timestamp(), 1_546_300_810);
        assert_eq!(trades[1].direction, TradeDirection::BridgeToFiat);
        assert_eq!(trades[1].amount, 250.5);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let t: Transaction = serde_json::from_str(
            r#"{"date": "1", "tid": "1", "price": "1", "amount": "1", "type": "2"}"#,
        )
        .unwrap();
        assert!(t.into_trade(&ExchangeId::from("x")).is_err());
    }

    #[test]
    fn ticker_last_price() {
        let ticker: Ticker =
            serde_json::from_str(r#"{"high": "0.4", "last": "0.3512", "volume": "1"}"#).unwrap();
        assert_eq!(ticker.last_price().unwrap(), 0.3512);

        let zero = Ticker { last: "0".into() };
        assert!(zero.last_price().is_err());
    }
}
