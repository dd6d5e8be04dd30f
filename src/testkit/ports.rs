//! Scripted port implementations.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::{ExchangeId, LedgerTransfer, Trade};
use crate::error::{FetchError, Result};
use crate::port::{LedgerSource, RateSource, TradeSource};

/// Trade source serving a fixed list of fills.
#[derive(Debug)]
pub struct StaticTradeSource {
    exchange: ExchangeId,
    trades: Vec<Trade>,
    calls: AtomicUsize,
}

impl StaticTradeSource {
    pub fn new(exchange: impl Into<ExchangeId>, trades: Vec<Trade>) -> Self {
        Self {
            exchange: exchange.into(),
            trades,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TradeSource for StaticTradeSource {
    fn exchange(&self) -> &ExchangeId {
        &self.exchange
    }

    async fn fetch_trades(&self, since: DateTime<Utc>) -> Result<Vec<Trade>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .trades
            .iter()
            .filter(|t| t.timestamp > since)
            .cloned()
            .collect())
    }
}

/// Trade source that always fails.
#[derive(Debug)]
pub struct FailingTradeSource {
    exchange: ExchangeId,
}

impl FailingTradeSource {
    pub fn new(exchange: impl Into<ExchangeId>) -> Self {
        Self {
            exchange: exchange.into(),
        }
    }
}

#[async_trait]
impl TradeSource for FailingTradeSource {
    fn exchange(&self) -> &ExchangeId {
        &self.exchange
    }

    async fn fetch_trades(&self, _since: DateTime<Utc>) -> Result<Vec<Trade>> {
        Err(FetchError::Trades {
            exchange: self.exchange.clone(),
            reason: "scripted failure".to_string(),
        }
        .into())
    }
}

/// Ledger returning the same transfers for every window.
///
/// Records each requested range and can be told to fail the next `n`
/// fetches.
#[derive(Debug, Default)]
pub struct ScriptedLedger {
    transfers: Mutex<Vec<LedgerTransfer>>,
    requests: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    failures: AtomicUsize,
}

impl ScriptedLedger {
    pub fn new(transfers: Vec<LedgerTransfer>) -> Self {
        Self {
            transfers: Mutex::new(transfers),
            ..Self::default()
        }
    }

    /// Fail the next `n` fetches.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn set_transfers(&self, transfers: Vec<LedgerTransfer>) {
        *self.transfers.lock() = transfers;
    }

    /// Every `(from, to)` range requested so far, failed ones included.
    pub fn requests(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LedgerSource for ScriptedLedger {
    async fn fetch_transfers(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LedgerTransfer>> {
        self.requests.lock().push((from, to));

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(FetchError::Ledger("scripted failure".to_string()).into());
        }

        Ok(self.transfers.lock().clone())
    }
}

/// Constant reference rate; `None` fails every request.
#[derive(Debug, Clone, Copy)]
pub struct FixedRate(pub Option<f64>);

impl FixedRate {
    pub fn new(rate: f64) -> Self {
        Self(Some(rate))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl RateSource for FixedRate {
    async fn reference_rate(&self) -> Result<f64> {
        self.0
            .ok_or_else(|| FetchError::Rate("scripted failure".to_string()).into())
    }
}
