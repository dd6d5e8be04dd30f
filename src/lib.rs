//! Bridgewatch - bridge-asset liquidity corridor detection.
//!
//! Watches ledger transfers of a bridge asset (XRP by default) between
//! addresses owned by known exchanges, and corroborates each transfer with
//! trade activity on the exchanges at either end. A transfer preceded by a
//! fiat-to-bridge buy at the source and/or followed by a bridge-to-fiat
//! sell at the destination is recorded as a corridor event.
//!
//! # Architecture
//!
//! - **`domain`** - Exchange registry, trades, transfers, corridor events, stats
//! - **`port`** - Trait seams: trade feeds, ledger, reference rate, store, notifier
//! - **`adapter`** - Bitstamp, Bitso and ledger HTTP clients; SQLite and memory stores
//! - **`application`** - Matchers, the detection pipeline and the window scheduler
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`app`] - Wiring from configuration to a running scheduler
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use bridgewatch::app::App;
//! use bridgewatch::config::Config;
//!
//! # async fn demo() -> bridgewatch::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! App::run(config).await
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
