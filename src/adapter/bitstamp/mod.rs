//! Bitstamp adapters.

mod client;
mod dto;

pub use client::{BitstampRateSource, BitstampTradeSource, DEFAULT_API_URL};
