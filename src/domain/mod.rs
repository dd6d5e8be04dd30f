//! Exchange-agnostic domain types.
//!
//! Everything here is pure data and pure functions: the exchange registry,
//! trades, ledger transfers, corridor events, window state and stats. No
//! I/O happens in this module.

mod corridor;
mod exchange;
mod fiat;
mod id;
mod stats;
mod trade;
mod transfer;
mod window;

pub mod error;

pub use corridor::{CorridorEvent, SpottedAt};
pub use error::DomainError;
pub use exchange::{Exchange, ExchangeRegistry};
pub use fiat::Fiat;
pub use id::{Address, ExchangeId, TxHash};
pub use stats::{CorridorVolume, Stats};
pub use trade::{Trade, TradeDirection};
pub use transfer::LedgerTransfer;
pub use window::{Window, WindowState};
