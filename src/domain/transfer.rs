//! Ledger-level transfers as reported by the ledger source.
//!
//! Amount and executed time are kept as the raw strings the ledger reported;
//! parsing happens when a transfer is mapped to a corridor event so that a
//! single malformed record can be dropped on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{Address, TxHash};

/// One ledger movement between two accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransfer {
    pub source: Address,
    pub destination: Address,
    /// Delivered amount, as reported.
    pub delivered_amount: String,
    /// Asset code of the delivered amount.
    pub asset: String,
    pub tx_hash: TxHash,
    pub destination_tag: Option<u32>,
    /// Execution time, RFC 3339.
    pub executed_time: String,
}

impl LedgerTransfer {
    /// Parse the execution time.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidTimestamp`] if the value is not RFC 3339.
    pub fn executed_at(&self) -> Result<DateTime<Utc>, DomainError> {
        DateTime::parse_from_rfc3339(&self.executed_time)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| DomainError::InvalidTimestamp {
                value: self.executed_time.clone(),
            })
    }

    /// Parse the delivered amount.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidAmount`] unless the value is a finite,
    /// positive number.
    pub fn amount(&self) -> Result<f64, DomainError> {
        match self.delivered_amount.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
            _ => Err(DomainError::InvalidAmount {
                value: self.delivered_amount.clone(),
            }),
        }
    }

    /// Whether the delivered asset is `bridge_asset`.
    #[must_use]
    pub fn is_asset(&self, bridge_asset: &str) -> bool {
        self.asset.eq_ignore_ascii_case(bridge_asset)
    }
}
