//! Implementations of ports (hexagonal adapters).
//!
//! - [`ripple`] - ledger transfers from the Ripple Data API
//! - [`bitstamp`], [`bitso`] - exchange trade feeds and the reference rate
//! - [`store`] - memory and SQLite event stores
//! - [`notifier`] - log, broadcast and fan-out notifiers
//! - [`factory`] - wiring from [`crate::config::Config`]

pub mod bitso;
pub mod bitstamp;
pub mod factory;
pub mod notifier;
pub mod ripple;
pub mod store;

mod http;
