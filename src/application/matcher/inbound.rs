//! Inbound-only corroboration: a sell on the destination after the
//! transfer. The source side is accepted on address identity alone.

use chrono::Duration;

use super::claims::TradeClaims;
use crate::domain::{CorridorEvent, Trade, TradeDirection};

pub(super) fn classify(
    event: CorridorEvent,
    trades: &[Trade],
    claims: &mut TradeClaims,
    window: Duration,
) -> Option<CorridorEvent> {
    let at = event.timestamp;
    let sells = claims.available(
        trades,
        &event.destination,
        TradeDirection::BridgeToFiat,
        at,
        at + window,
    );
    if sells.is_empty() {
        return None;
    }

    claims.claim_all(sells);
    Some(event)
}
