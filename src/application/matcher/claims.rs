//! Trades already used as evidence within one search.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::domain::{ExchangeId, Trade, TradeDirection};

/// Claimed trade keys for a single matcher invocation.
///
/// A trade that corroborated one transfer cannot corroborate another in the
/// same search. Claims never outlive the search that created them.
#[derive(Debug, Default)]
pub struct TradeClaims {
    claimed: HashSet<(ExchangeId, String)>,
}

impl TradeClaims {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_claimed(&self, trade: &Trade) -> bool {
        self.claimed
            .contains(&(trade.exchange.clone(), trade.order_id.clone()))
    }

    /// Claim every trade in `trades`.
    pub fn claim_all<'a>(&mut self, trades: impl IntoIterator<Item = &'a Trade>) {
        self.claimed.extend(trades.into_iter().map(Trade::claim_key));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    /// Unclaimed trades on `exchange` in `direction` strictly inside
    /// `(start, end)`.
    pub fn available<'t>(
        &self,
        trades: &'t [Trade],
        exchange: &ExchangeId,
        direction: TradeDirection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&'t Trade> {
        trades
            .iter()
            .filter(|t| &t.exchange == exchange)
            .filter(|t| t.direction == direction)
            .filter(|t| t.within(start, end))
            .filter(|t| !self.is_claimed(t))
            .collect()
    }
}
