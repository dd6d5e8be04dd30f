//! Exchange fills used as corridor evidence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ExchangeId;

/// Conversion implied by a fill, seen from the taker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    /// Fiat sold for the bridge asset (a buy of the asset).
    FiatToBridge,
    /// Bridge asset sold for fiat.
    BridgeToFiat,
}

/// A single fill on an exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Filled quantity in bridge-asset units.
    pub amount: f64,
    /// Price in the exchange's local fiat.
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
    /// Exchange-assigned id, unique per exchange.
    pub order_id: String,
    pub exchange: ExchangeId,
    pub direction: TradeDirection,
}

impl Trade {
    /// Key used to claim this trade during matching.
    #[must_use]
    pub fn claim_key(&self) -> (ExchangeId, String) {
        (self.exchange.clone(), self.order_id.clone())
    }

    /// Whether this fill happened strictly inside `(start, end)`.
    #[must_use]
    pub fn within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.timestamp > start && self.timestamp < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trade_at(secs: i64) -> Trade {
        Trade {
            amount: 10.0,
            rate: 0.5,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            order_id: "1".into(),
            exchange: ExchangeId::from("x"),
            direction: TradeDirection::FiatToBridge,
        }
    }

    #[test]
    fn within_excludes_boundaries() {
        let start = Utc.timestamp_opt(970, 0).unwrap();
        let end = Utc.timestamp_opt(1000, 0).unwrap();
        assert!(!trade_at(970).within(start, end));
        assert!(trade_at(971).within(start, end));
        assert!(!trade_at(1000).within(start, end));
    }

    #[test]
    fn direction_serializes_snake_case() {
        let json = serde_json::to_string(&TradeDirection::BridgeToFiat).unwrap();
        assert_eq!(json, "\"bridge_to_fiat\"");
    }
}
