//! Builders for domain primitives used across tests.
//!
//! The canonical corridor fixture is three exchanges:
//!
//! | id | fiat | address | trade feed | confirmed |
//! |----|------|---------|------------|-----------|
//! | `x` | EUR | `rX` | yes | yes |
//! | `y` | USD | `rY` | yes | yes |
//! | `z` | PHP | `rZ` | no  | yes |

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{
    Address, CorridorEvent, Exchange, ExchangeId, ExchangeRegistry, Fiat, LedgerTransfer,
    SpottedAt, Trade, TradeDirection, TxHash,
};

/// UTC instant `secs` after the epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .expect("fixture timestamp in range")
}

/// An exchange with one address.
pub fn exchange(id: &str, fiat: Fiat, address: &str, has_api: bool) -> Exchange {
    Exchange::new(id, id.to_uppercase(), fiat, vec![Address::from(address)])
        .confirmed(true)
        .with_api(has_api)
}

/// The `x` / `y` / `z` registry described in the module docs.
pub fn corridor_registry() -> Arc<ExchangeRegistry> {
    let registry = ExchangeRegistry::new(vec![
        exchange("x", Fiat::Eur, "rX", true),
        exchange("y", Fiat::Usd, "rY", true),
        exchange("z", Fiat::Php, "rZ", false),
    ])
    .expect("valid fixture registry");
    Arc::new(registry)
}

/// A bridge-asset transfer executed at `secs`.
pub fn transfer(
    hash: &str,
    source: &str,
    destination: &str,
    amount: f64,
    secs: i64,
) -> LedgerTransfer {
    LedgerTransfer {
        source: Address::from(source),
        destination: Address::from(destination),
        delivered_amount: amount.to_string(),
        asset: "XRP".to_string(),
        tx_hash: TxHash::from(hash),
        destination_tag: None,
        executed_time: at(secs).to_rfc3339(),
    }
}

fn trade(exchange: &str, order_id: &str, secs: i64, direction: TradeDirection) -> Trade {
    Trade {
        amount: 1000.0,
        rate: 1.0,
        timestamp: at(secs),
        order_id: order_id.to_string(),
        exchange: ExchangeId::from(exchange),
        direction,
    }
}

/// A fiat-to-bridge fill on `exchange` at `secs`.
pub fn buy(exchange: &str, order_id: &str, secs: i64) -> Trade {
    trade(exchange, order_id, secs, TradeDirection::FiatToBridge)
}

/// A bridge-to-fiat fill on `exchange` at `secs`.
pub fn sell(exchange: &str, order_id: &str, secs: i64) -> Trade {
    trade(exchange, order_id, secs, TradeDirection::BridgeToFiat)
}

/// A confirmed `x -> y` event with the given hash.
pub fn event(hash: &str, secs: i64, usd_value: f64) -> CorridorEvent {
    CorridorEvent {
        amount: usd_value * 2.0,
        source: ExchangeId::from("x"),
        destination: ExchangeId::from("y"),
        source_fiat: Fiat::Eur,
        destination_fiat: Fiat::Usd,
        source_address: Address::from("rX"),
        destination_address: Address::from("rY"),
        tx_hash: TxHash::from(hash),
        tag: None,
        timestamp: at(secs),
        usd_value,
        confirmed: true,
        spotted_at: SpottedAt::SourceAndDestination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corridor_registry_is_not_silently_empty() {
        assert_eq!(corridor_registry().len(), 3);
    }

    #[test]
    #[should_panic(expected = "fixture timestamp in range")]
    fn out_of_range_timestamp_panics() {
        at(i64::MAX);
    }
}
