//! Ledger source backed by the Ripple Data API.

mod client;
mod dto;

pub use client::RippleLedgerClient;
