//! Trade feed port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ExchangeId, Trade};
use crate::error::Result;

/// Source of recent fills for one exchange.
///
/// Implementations own their own timeouts. A failure is isolated by the
/// aggregator and only removes this exchange's trades from the cycle.
#[async_trait]
pub trait TradeSource: Send + Sync {
    /// Exchange this source reports for.
    fn exchange(&self) -> &ExchangeId;

    /// Fetch fills strictly after `since`.
    async fn fetch_trades(&self, since: DateTime<Utc>) -> Result<Vec<Trade>>;
}
