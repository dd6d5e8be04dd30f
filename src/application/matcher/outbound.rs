//! Outbound-only corroboration: a buy on the source before the transfer.
//!
//! Exchanges that run several fiat books behind one address are checked
//! book by book; the first book with a matching buy becomes the source.

use chrono::Duration;

use super::claims::TradeClaims;
use crate::domain::{CorridorEvent, ExchangeRegistry, Trade, TradeDirection};

pub(super) fn classify(
    mut event: CorridorEvent,
    trades: &[Trade],
    claims: &mut TradeClaims,
    registry: &ExchangeRegistry,
    window: Duration,
) -> Option<CorridorEvent> {
    let at = event.timestamp;

    for book in registry
        .books_at(&event.source_address)
        .filter(|book| book.has_api())
    {
        let buys = claims.available(
            trades,
            book.id(),
            TradeDirection::FiatToBridge,
            at - window,
            at,
        );
        if buys.is_empty() {
            continue;
        }

        claims.claim_all(buys);

        let destination_confirmed = registry
            .get(&event.destination)
            .is_some_and(|d| d.is_confirmed());
        event.source = book.id().clone();
        event.source_fiat = book.fiat();
        event.confirmed = book.is_confirmed() && destination_confirmed;
        return Some(event);
    }

    None
}
