//! End-to-end corroboration: a buy on the source before the transfer and a
//! sell on the destination after it.

use chrono::Duration;

use super::claims::TradeClaims;
use crate::domain::{CorridorEvent, Trade, TradeDirection};

/// Keep `event` if both legs trade within `delta` of the transfer.
///
/// Every unclaimed trade found on either leg is claimed.
pub(super) fn classify(
    event: CorridorEvent,
    trades: &[Trade],
    claims: &mut TradeClaims,
    delta: Duration,
) -> Option<CorridorEvent> {
    let at = event.timestamp;

    let buys = claims.available(
        trades,
        &event.source,
        TradeDirection::FiatToBridge,
        at - delta,
        at,
    );
    if buys.is_empty() {
        return None;
    }

    let sells = claims.available(
        trades,
        &event.destination,
        TradeDirection::BridgeToFiat,
        at,
        at + delta,
    );
    if sells.is_empty() {
        return None;
    }

    claims.claim_all(buys.into_iter().chain(sells));
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, ExchangeId, Fiat, SpottedAt, TxHash};
    use chrono::{TimeZone, Utc};

    fn event() -> CorridorEvent {
        CorridorEvent {
            amount: 1000.0,
            source: ExchangeId::from("x"),
            destination: ExchangeId::from("y"),
            source_fiat: Fiat::Eur,
            destination_fiat: Fiat::Usd,
            source_address: Address::from("rA"),
            destination_address: Address::from("rB"),
            tx_hash: TxHash::from("H"),
            tag: None,
            timestamp: Utc.timestamp_opt(1000, 0).unwrap(),
            usd_value: 300.0,
            confirmed: true,
            spotted_at: SpottedAt::SourceAndDestination,
        }
    }

    fn trade(id: &str, exchange: &str, secs: i64, direction: TradeDirection) -> Trade {
        Trade {
            amount: 1000.0,
            rate: 0.3,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            order_id: id.into(),
            exchange: ExchangeId::from(exchange),
            direction,
        }
    }

    #[test]
    fn needs_both_legs() {
        let only_buy = vec![trade("1", "x", 970, TradeDirection::FiatToBridge)];
        let mut claims = TradeClaims::new();
        assert!(classify(event(), &only_buy, &mut claims, Duration::seconds(60)).is_none());
        assert!(claims.is_empty());

        let only_sell = vec![trade("2", "y", 1030, TradeDirection::BridgeToFiat)];
        assert!(classify(event(), &only_sell, &mut claims, Duration::seconds(60)).is_none());
    }

    #[test]
    fn sell_must_follow_transfer() {
        let trades = vec![
            trade("1", "x", 970, TradeDirection::FiatToBridge),
            trade("2", "y", 990, TradeDirection::BridgeToFiat),
        ];
        let mut claims = TradeClaims::new();
        assert!(classify(event(), &trades, &mut claims, Duration::seconds(60)).is_none());
    }

    #[test]
    fn match_claims_both_legs() {
        let trades = vec![
            trade("1", "x", 970, TradeDirection::FiatToBridge),
            trade("2", "y", 1030, TradeDirection::BridgeToFiat),
        ];
        let mut claims = TradeClaims::new();
        assert!(classify(event(), &trades, &mut claims, Duration::seconds(60)).is_some());
        assert_eq!(claims.len(), 2);

        // The same trades cannot corroborate a second transfer.
        let mut second = event();
        second.tx_hash = TxHash::from("H2");
        assert!(classify(second, &trades, &mut claims, Duration::seconds(60)).is_none());
    }
}
