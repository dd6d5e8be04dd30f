//! Builds port implementations from configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::bitso::{self, BitsoTradeSource};
use super::bitstamp::{self, BitstampRateSource, BitstampTradeSource};
use super::notifier::{BroadcastNotifier, LogNotifier, NotifierRegistry, NullNotifier};
use super::ripple::RippleLedgerClient;
use super::store::{MemoryEventStore, SqliteEventStore};
use crate::config::{Config, ExchangeConfig, SourceKind};
use crate::domain::ExchangeId;
use crate::error::Result;
use crate::port::{EventStore, LedgerSource, RateSource, TradeSource};

/// One trade source per configured exchange that has a feed.
///
/// # Errors
/// Returns an error if an HTTP client cannot be built.
pub fn trade_sources(config: &Config) -> Result<Vec<Arc<dyn TradeSource>>> {
    config
        .exchanges()
        .iter()
        .filter_map(|exchange| trade_source(exchange).transpose())
        .collect()
}

fn trade_source(exchange: &ExchangeConfig) -> Result<Option<Arc<dyn TradeSource>>> {
    let Some(source) = &exchange.source else {
        return Ok(None);
    };
    let id = ExchangeId::from(exchange.id.as_str());
    let timeout = Duration::from_secs(source.timeout_secs);

    let built: Arc<dyn TradeSource> = match source.kind {
        SourceKind::Bitstamp => Arc::new(BitstampTradeSource::new(
            id,
            source.book.as_str(),
            source.api_url.as_deref().unwrap_or(bitstamp::DEFAULT_API_URL),
            timeout,
        )?),
        SourceKind::Bitso => Arc::new(BitsoTradeSource::new(
            id,
            source.book.as_str(),
            source.api_url.as_deref().unwrap_or(bitso::DEFAULT_API_URL),
            timeout,
        )?),
    };
    Ok(Some(built))
}

/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn ledger_source(config: &Config) -> Result<Arc<dyn LedgerSource>> {
    Ok(Arc::new(RippleLedgerClient::new(
        config.ledger.api_url.as_str(),
        config.matching.bridge_asset.as_str(),
        config.ledger.page_limit,
        config.ledger_timeout(),
    )?))
}

/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn rate_source(config: &Config) -> Result<Arc<dyn RateSource>> {
    Ok(Arc::new(BitstampRateSource::new(
        config.rate.pair.as_str(),
        config.rate.api_url.as_str(),
        config.rate_timeout(),
    )?))
}

/// SQLite when a database path is configured, memory otherwise.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn event_store(config: &Config) -> Result<Arc<dyn EventStore>> {
    match &config.database.path {
        Some(path) => {
            info!(path = %path, "Using SQLite event store");
            Ok(Arc::new(SqliteEventStore::open(path)?))
        }
        None => {
            info!("No database configured, events are kept in memory");
            Ok(Arc::new(MemoryEventStore::new()))
        }
    }
}

/// Build the notifier registry from `[notifier]`.
///
/// Returns the broadcast handle alongside the registry when the live
/// channel is enabled, so callers can subscribe to it.
pub fn notifiers(config: &Config) -> (NotifierRegistry, Option<BroadcastNotifier>) {
    let mut registry = NotifierRegistry::new();
    if config.notifier.log {
        registry.register(Box::new(LogNotifier));
    }

    let live = config.notifier.broadcast_capacity.map(|capacity| {
        let live = BroadcastNotifier::new(capacity);
        registry.register(Box::new(live.clone()));
        info!(capacity, "Live broadcast channel enabled");
        live
    });

    if registry.is_empty() {
        info!("Notifications disabled");
        registry.register(Box::new(NullNotifier));
    }

    (registry, live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{Notifier, EVENT_TOPIC};
    use crate::testkit::domain::event;

    #[test]
    fn builtin_catalog_has_three_feeds() {
        let sources = trade_sources(&Config::default()).unwrap();
        let ids: Vec<_> = sources.iter().map(|s| s.exchange().as_str()).collect();
        assert_eq!(ids, vec!["bitstamp-usd", "bitstamp-eur", "bitso"]);
    }

    #[tokio::test]
    async fn memory_store_without_database() {
        let store = event_store(&Config::default()).unwrap();
        assert!(store.calculate_stats().await.unwrap().is_none());
    }

    #[test]
    fn default_notifiers_log_only() {
        let (registry, live) = notifiers(&Config::default());
        assert_eq!(registry.len(), 1);
        assert!(live.is_none());
    }

    #[test]
    fn broadcast_capacity_enables_live_channel() {
        let config = Config::parse("[notifier]\nbroadcast_capacity = 4").unwrap();
        let (registry, live) = notifiers(&config);
        assert_eq!(registry.len(), 2);

        let mut rx = live.unwrap().subscribe();
        registry.notify(event("H1", 1000, 42.0).into());

        let message = rx.try_recv().unwrap();
        assert_eq!(message.topic, EVENT_TOPIC);
        assert_eq!(message.payload["tx_hash"], "H1");
    }

    #[test]
    fn disabled_notifiers_fall_back_to_null() {
        let config = Config::parse("[notifier]\nlog = false").unwrap();
        let (registry, live) = notifiers(&config);
        assert_eq!(registry.len(), 1);
        assert!(live.is_none());
        registry.notify(event("H1", 1000, 42.0).into());
    }
}
