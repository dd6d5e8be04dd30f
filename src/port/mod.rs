//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The detection core talks to the outside world exclusively through these
//! traits; adapters in [`crate::adapter`] implement them.
//!
//! # Available Ports
//!
//! - [`TradeSource`] - Per-exchange trade feeds
//! - [`LedgerSource`] - Ledger transfers for a time range
//! - [`RateSource`] - Bridge-asset reference rate
//! - [`EventStore`] - Idempotent persistence and stats
//! - [`Notifier`] - Live event and stats push

mod exchange;
mod ledger;
mod notifier;
mod store;

pub use exchange::TradeSource;
pub use ledger::{LedgerSource, RateSource};
pub use notifier::{Event, Notifier, EVENT_TOPIC, STATS_TOPIC};
pub use store::EventStore;
