//! Data API v2 response types.

use serde::Deserialize;

use crate::domain::{Address, LedgerTransfer, TxHash};

/// One page of `GET /payments`.
#[derive(Debug, Deserialize)]
pub struct PaymentsResponse {
    pub result: String,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A single payment as reported by the Data API.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub source: String,
    pub destination: String,
    pub delivered_amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub destination_tag: Option<u32>,
    pub executed_time: String,
    pub tx_hash: String,
}

impl From<Payment> for LedgerTransfer {
    fn from(payment: Payment) -> Self {
        Self {
            source: Address::from(payment.source),
            destination: Address::from(payment.destination),
            delivered_amount: payment.delivered_amount,
            asset: payment.currency,
            tx_hash: TxHash::from(payment.tx_hash),
            destination_tag: payment.destination_tag,
            executed_time: payment.executed_time,
        }
    }
}
