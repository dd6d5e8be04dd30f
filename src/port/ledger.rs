//! Ledger and reference-rate ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::LedgerTransfer;
use crate::error::Result;

/// Source of ledger transfers for a time range.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Fetch transfers executed within `[from, to]`.
    async fn fetch_transfers(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LedgerTransfer>>;
}

/// Bridge-asset to USD reference rate.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn reference_rate(&self) -> Result<f64>;
}
