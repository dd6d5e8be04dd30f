//! Concurrent trade collection across exchanges.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::domain::{ExchangeId, ExchangeRegistry, Trade};
use crate::port::TradeSource;

/// Fans a trade fetch out to every registered source.
///
/// A failing source is logged and skipped; the remaining sources still
/// contribute their trades.
#[derive(Clone, Default)]
pub struct TradeAggregator {
    sources: Vec<Arc<dyn TradeSource>>,
}

impl TradeAggregator {
    pub fn new(sources: Vec<Arc<dyn TradeSource>>) -> Self {
        Self { sources }
    }

    /// Drop sources whose exchange is not a confirmed registry entry.
    #[must_use]
    pub fn confirmed_only(mut self, registry: &ExchangeRegistry) -> Self {
        self.sources.retain(|source| {
            let keep = registry
                .get(source.exchange())
                .is_some_and(|e| e.is_confirmed());
            if !keep {
                debug!(exchange = %source.exchange(), "Skipping unconfirmed trade source");
            }
            keep
        });
        self
    }

    /// Exchanges polled by this aggregator.
    pub fn exchanges(&self) -> impl Iterator<Item = &ExchangeId> {
        self.sources.iter().map(|s| s.exchange())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Fetch trades after `since` from every source concurrently.
    pub async fn collect(&self, since: DateTime<Utc>) -> Vec<Trade> {
        let fetches = self.sources.iter().map(|source| async move {
            (source.exchange(), source.fetch_trades(since).await)
        });

        let mut trades = Vec::new();
        for (exchange, result) in join_all(fetches).await {
            match result {
                Ok(batch) => {
                    debug!(exchange = %exchange, trades = batch.len(), "Trades fetched");
                    trades.extend(batch);
                }
                Err(e) => {
                    warn!(
                        exchange = %exchange,
                        error = %e,
                        "Trade fetch failed, skipping exchange"
                    );
                }
            }
        }
        trades
    }
}

impl std::fmt::Debug for TradeAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeAggregator")
            .field("sources", &self.exchanges().collect::<Vec<_>>())
            .finish()
    }
}
