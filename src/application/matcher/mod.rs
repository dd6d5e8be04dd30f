//! Corridor matchers.
//!
//! One [`CorridorMatcher`] value per search, tagged with a [`Strategy`].
//! Every strategy runs through the same pipeline:
//!
//! ```text
//! candidate filter -> scope -> map to event -> trade evidence -> sort
//! ```
//!
//! - **End-to-end** - buy on the source before, sell on the destination
//!   after (`SOURCE_AND_DESTINATION`)
//! - **Inbound** - sell on the destination after; the source has no trade
//!   feed (`DESTINATION`)
//! - **Outbound** - buy on the source before; the destination has no trade
//!   feed (`SOURCE`)
//!
//! Trade claims live for one [`CorridorMatcher::search`] call and are never
//! shared between matchers, so two matchers may both use the same trade.

mod claims;
mod end_to_end;
mod inbound;
mod outbound;

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use super::candidate::{is_candidate, map_transfer};
use crate::domain::{
    CorridorEvent, ExchangeId, ExchangeRegistry, Fiat, LedgerTransfer, SpottedAt, Trade,
};

pub use claims::TradeClaims;

/// Shared, read-only inputs every matcher needs.
#[derive(Debug, Clone)]
pub struct MatchContext {
    pub registry: Arc<ExchangeRegistry>,
    /// Asset code a transfer must move to be considered.
    pub bridge_asset: String,
}

impl MatchContext {
    pub fn new(registry: Arc<ExchangeRegistry>, bridge_asset: impl Into<String>) -> Self {
        Self {
            registry,
            bridge_asset: bridge_asset.into(),
        }
    }
}

/// Which evidence a matcher requires, and for which corridor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Transfers from a `source_fiat` book into `destination`, corroborated
    /// on both sides within `delta`.
    EndToEnd {
        source_fiat: Fiat,
        destination: ExchangeId,
        delta: Duration,
    },
    /// Transfers into `destination` from exchanges without a trade feed.
    Inbound {
        destination: ExchangeId,
        window: Duration,
    },
    /// Transfers into `destination`, which has no trade feed, from
    /// exchanges that have one.
    Outbound {
        destination: ExchangeId,
        window: Duration,
    },
}

impl Strategy {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::EndToEnd { .. } => "end_to_end",
            Strategy::Inbound { .. } => "inbound",
            Strategy::Outbound { .. } => "outbound",
        }
    }

    #[must_use]
    pub fn spotted_at(&self) -> SpottedAt {
        match self {
            Strategy::EndToEnd { .. } => SpottedAt::SourceAndDestination,
            Strategy::Inbound { .. } => SpottedAt::Destination,
            Strategy::Outbound { .. } => SpottedAt::Source,
        }
    }

    #[must_use]
    pub fn destination(&self) -> &ExchangeId {
        match self {
            Strategy::EndToEnd { destination, .. }
            | Strategy::Inbound { destination, .. }
            | Strategy::Outbound { destination, .. } => destination,
        }
    }

    fn source_fiat(&self) -> Option<Fiat> {
        match self {
            Strategy::EndToEnd { source_fiat, .. } => Some(*source_fiat),
            Strategy::Inbound { .. } | Strategy::Outbound { .. } => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::EndToEnd {
                source_fiat,
                destination,
                delta,
            } => write!(
                f,
                "end_to_end({source_fiat} -> {destination}, {}s)",
                delta.num_seconds()
            ),
            Strategy::Inbound { destination, .. } => write!(f, "inbound(-> {destination})"),
            Strategy::Outbound { destination, .. } => write!(f, "outbound(-> {destination})"),
        }
    }
}

/// A single corridor search.
#[derive(Debug, Clone)]
pub struct CorridorMatcher {
    strategy: Strategy,
}

impl CorridorMatcher {
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    #[must_use]
    pub fn end_to_end(source_fiat: Fiat, destination: ExchangeId, delta: Duration) -> Self {
        Self::new(Strategy::EndToEnd {
            source_fiat,
            destination,
            delta,
        })
    }

    #[must_use]
    pub fn inbound(destination: ExchangeId, window: Duration) -> Self {
        Self::new(Strategy::Inbound {
            destination,
            window,
        })
    }

    #[must_use]
    pub fn outbound(destination: ExchangeId, window: Duration) -> Self {
        Self::new(Strategy::Outbound {
            destination,
            window,
        })
    }

    #[must_use]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Find corroborated transfers, ordered by timestamp.
    #[must_use]
    pub fn search(
        &self,
        transfers: &[LedgerTransfer],
        trades: &[Trade],
        rate: f64,
        ctx: &MatchContext,
    ) -> Vec<CorridorEvent> {
        let mut claims = TradeClaims::new();

        let mut events: Vec<CorridorEvent> = transfers
            .iter()
            .filter(|t| is_candidate(t, &ctx.registry, &ctx.bridge_asset))
            .filter(|t| self.in_scope(t, &ctx.registry))
            .filter_map(|t| self.classify(t, trades, rate, ctx, &mut claims))
            .collect();

        events.sort_by_key(|e| e.timestamp);

        debug!(
            matcher = %self.strategy,
            transfers = transfers.len(),
            matched = events.len(),
            claimed_trades = claims.len(),
            "Corridor search complete"
        );

        events
    }

    /// Map one transfer and keep it if the strategy's trade evidence exists.
    ///
    /// Trades used as evidence are added to `claims`.
    pub fn classify(
        &self,
        transfer: &LedgerTransfer,
        trades: &[Trade],
        rate: f64,
        ctx: &MatchContext,
        claims: &mut TradeClaims,
    ) -> Option<CorridorEvent> {
        let event = match map_transfer(
            transfer,
            &ctx.registry,
            self.strategy.source_fiat(),
            rate,
            self.strategy.spotted_at(),
        ) {
            Ok(event) => event,
            Err(e) => {
                debug!(
                    matcher = %self.strategy,
                    tx_hash = %transfer.tx_hash,
                    reason = %e,
                    "Dropping transfer"
                );
                return None;
            }
        };

        match &self.strategy {
            Strategy::EndToEnd { delta, .. } => end_to_end::classify(event, trades, claims, *delta),
            Strategy::Inbound { window, .. } => inbound::classify(event, trades, claims, *window),
            Strategy::Outbound { window, .. } => {
                outbound::classify(event, trades, claims, &ctx.registry, *window)
            }
        }
    }

    /// Whether a candidate transfer belongs to this matcher's corridor.
    fn in_scope(&self, transfer: &LedgerTransfer, registry: &ExchangeRegistry) -> bool {
        let Some(destination) = registry.by_address(&transfer.destination) else {
            return false;
        };
        if destination.id() != self.strategy.destination() {
            return false;
        }

        match &self.strategy {
            Strategy::EndToEnd { .. } => true,
            Strategy::Inbound { .. } => registry
                .by_address(&transfer.source)
                .is_some_and(|source| !source.has_api()),
            Strategy::Outbound { .. } => registry
                .books_at(&transfer.source)
                .any(|source| source.has_api()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, Exchange, TradeDirection, TxHash};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn ctx() -> MatchContext {
        let registry = ExchangeRegistry::new(vec![
            Exchange::new("x", "X", Fiat::Eur, vec![Address::from("rX")])
                .confirmed(true)
                .with_api(true),
            Exchange::new("y", "Y", Fiat::Usd, vec![Address::from("rY")])
                .confirmed(true)
                .with_api(true),
            Exchange::new("z", "Z", Fiat::Php, vec![Address::from("rZ")]),
        ])
        .unwrap();
        MatchContext::new(Arc::new(registry), "XRP")
    }

    fn transfer(hash: &str, source: &str, destination: &str, secs: i64) -> LedgerTransfer {
        LedgerTransfer {
            source: Address::from(source),
            destination: Address::from(destination),
            delivered_amount: "1000".into(),
            asset: "XRP".into(),
            tx_hash: TxHash::from(hash),
            destination_tag: None,
            executed_time: at(secs).to_rfc3339(),
        }
    }

    fn trade(id: &str, exchange: &str, secs: i64, direction: TradeDirection) -> Trade {
        Trade {
            amount: 1000.0,
            rate: 0.3,
            timestamp: at(secs),
            order_id: id.into(),
            exchange: ExchangeId::from(exchange),
            direction,
        }
    }

    #[test]
    fn results_are_sorted_by_timestamp() {
        let ctx = ctx();
        let transfers = vec![
            transfer("late", "rX", "rY", 2000),
            transfer("early", "rX", "rY", 1000),
        ];
        let trades = vec![
            trade("b1", "x", 970, TradeDirection::FiatToBridge),
            trade("s1", "y", 1030, TradeDirection::BridgeToFiat),
            trade("b2", "x", 1970, TradeDirection::FiatToBridge),
            trade("s2", "y", 2030, TradeDirection::BridgeToFiat),
        ];
        let matcher =
            CorridorMatcher::end_to_end(Fiat::Eur, ExchangeId::from("y"), Duration::seconds(60));

        let events = matcher.search(&transfers, &trades, 0.5, &ctx);
        let hashes: Vec<_> = events.iter().map(|e| e.tx_hash.as_str()).collect();
        assert_eq!(hashes, vec!["early", "late"]);
    }

    #[test]
    fn one_trade_cannot_back_two_transfers() {
        let ctx = ctx();
        let transfers = vec![
            transfer("a", "rX", "rY", 1000),
            transfer("b", "rX", "rY", 1005),
        ];
        let trades = vec![
            trade("b1", "x", 990, TradeDirection::FiatToBridge),
            trade("s1", "y", 1010, TradeDirection::BridgeToFiat),
        ];
        let matcher =
            CorridorMatcher::end_to_end(Fiat::Eur, ExchangeId::from("y"), Duration::seconds(60));

        let events = matcher.search(&transfers, &trades, 0.5, &ctx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tx_hash.as_str(), "a");
    }

    #[test]
    fn claims_are_per_search() {
        let ctx = ctx();
        let transfers = vec![transfer("a", "rX", "rY", 1000)];
        let trades = vec![
            trade("b1", "x", 990, TradeDirection::FiatToBridge),
            trade("s1", "y", 1010, TradeDirection::BridgeToFiat),
        ];
        let matcher =
            CorridorMatcher::end_to_end(Fiat::Eur, ExchangeId::from("y"), Duration::seconds(60));

        assert_eq!(matcher.search(&transfers, &trades, 0.5, &ctx).len(), 1);
        assert_eq!(matcher.search(&transfers, &trades, 0.5, &ctx).len(), 1);
    }

    #[test]
    fn out_of_scope_destination_is_ignored() {
        let ctx = ctx();
        let transfers = vec![transfer("a", "rY", "rX", 1000)];
        let trades = vec![
            trade("b1", "y", 990, TradeDirection::FiatToBridge),
            trade("s1", "x", 1010, TradeDirection::BridgeToFiat),
        ];
        let matcher =
            CorridorMatcher::end_to_end(Fiat::Usd, ExchangeId::from("y"), Duration::seconds(60));
        assert!(matcher.search(&transfers, &trades, 0.5, &ctx).is_empty());
    }

    #[test]
    fn inbound_only_takes_sources_without_feed() {
        let ctx = ctx();
        let transfers = vec![
            transfer("from-z", "rZ", "rY", 1000),
            transfer("from-x", "rX", "rY", 1000),
        ];
        let trades = vec![
            trade("s1", "y", 1010, TradeDirection::BridgeToFiat),
            trade("s2", "y", 1020, TradeDirection::BridgeToFiat),
        ];
        let matcher = CorridorMatcher::inbound(ExchangeId::from("y"), Duration::seconds(120));

        let events = matcher.search(&transfers, &trades, 0.5, &ctx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tx_hash.as_str(), "from-z");
        assert_eq!(events[0].spotted_at, SpottedAt::Destination);
        assert!(!events[0].confirmed);
    }

    #[test]
    fn malformed_transfer_is_dropped_alone() {
        let ctx = ctx();
        let mut broken = transfer("broken", "rX", "rZ", 1000);
        broken.executed_time = "garbage".into();
        let transfers = vec![broken, transfer("ok", "rX", "rZ", 1000)];
        let trades = vec![trade("b1", "x", 990, TradeDirection::FiatToBridge)];
        let matcher = CorridorMatcher::outbound(ExchangeId::from("z"), Duration::seconds(120));

        let events = matcher.search(&transfers, &trades, 0.5, &ctx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tx_hash.as_str(), "ok");
        assert_eq!(events[0].spotted_at, SpottedAt::Source);
    }

    #[test]
    fn strategy_display_names_corridor() {
        let strategy = Strategy::EndToEnd {
            source_fiat: Fiat::Eur,
            destination: ExchangeId::from("y"),
            delta: Duration::seconds(30),
        };
        assert_eq!(strategy.to_string(), "end_to_end(EUR -> y, 30s)");
        assert_eq!(strategy.name(), "end_to_end");
    }
}
