//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for exchanges, trades, transfers and events.
//! - [`ports`] - Scripted port implementations: `StaticTradeSource`,
//!   `FailingTradeSource`, `ScriptedLedger`, `FixedRate`.
//! - [`notifier`] - `RecordingNotifier` for notification assertions.

pub mod domain;
pub mod notifier;
pub mod ports;
