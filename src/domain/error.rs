//! Domain errors for core domain types.
//!
//! These errors are returned when a raw ledger transfer cannot be mapped to
//! a corridor event, or when a registry entry violates its invariants. A
//! mapping error drops the offending transfer only; it never aborts a batch.

use thiserror::Error;

use super::id::{Address, ExchangeId};

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Executed time of a transfer is not a valid RFC 3339 timestamp.
    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp {
        /// The raw value that failed to parse.
        value: String,
    },

    /// Delivered amount is not a finite positive number.
    #[error("invalid amount '{value}'")]
    InvalidAmount {
        /// The raw value that failed to parse.
        value: String,
    },

    /// Address does not belong to any registered exchange.
    #[error("address {address} is not a known exchange")]
    UnknownAddress {
        /// The unresolved address.
        address: Address,
    },

    /// Source and destination resolve to the same exchange.
    #[error("transfer stays within exchange {exchange}")]
    SameExchange {
        /// The exchange on both sides.
        exchange: ExchangeId,
    },

    /// Transfer moved an asset other than the bridge asset.
    #[error("asset {asset} is not the bridge asset")]
    WrongAsset {
        /// The asset that was moved.
        asset: String,
    },

    /// Currency code is not a supported fiat.
    #[error("unknown currency '{code}'")]
    UnknownCurrency {
        /// The unrecognized code.
        code: String,
    },

    /// Exchange registry entries must carry at least one address.
    #[error("exchange {exchange} has no ledger address")]
    NoAddresses {
        /// The offending exchange.
        exchange: ExchangeId,
    },

    /// Exchange ids must be unique within a registry.
    #[error("duplicate exchange id {exchange}")]
    DuplicateExchange {
        /// The repeated id.
        exchange: ExchangeId,
    },
}
