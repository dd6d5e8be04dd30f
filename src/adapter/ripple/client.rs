//! Ripple Data API v2 ledger client.
//!
//! Pages through `GET {api_url}/payments` for the requested range,
//! following the response marker until the last page.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use tracing::debug;

use super::dto::PaymentsResponse;
use crate::adapter::http;
use crate::domain::LedgerTransfer;
use crate::error::{FetchError, Result};
use crate::port::LedgerSource;

/// Upper bound on pages per range, guarding against a marker loop.
const MAX_PAGES: usize = 100;

/// HTTP client for bridge-asset payments on the ledger.
pub struct RippleLedgerClient {
    client: Client,
    api_url: String,
    asset: String,
    page_limit: u32,
}

impl RippleLedgerClient {
    /// Create a client for `asset` payments.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_url: impl Into<String>,
        asset: impl Into<String>,
        page_limit: u32,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http::client(timeout)?,
            api_url: api_url.into(),
            asset: asset.into(),
            page_limit,
        })
    }

    async fn fetch_page(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        marker: Option<&str>,
    ) -> Result<PaymentsResponse> {
        let mut url = http::endpoint(&self.api_url, "payments")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("currency", &self.asset)
                .append_pair("start", &from.to_rfc3339_opts(SecondsFormat::Secs, true))
                .append_pair("end", &to.to_rfc3339_opts(SecondsFormat::Secs, true))
                .append_pair("limit", &self.page_limit.to_string());
            if let Some(marker) = marker {
                query.append_pair("marker", marker);
            }
        }

        let response = self.client.get(url).send().await?.error_for_status()?;
        let page: PaymentsResponse = response.json().await?;

        if page.result != "success" {
            return Err(FetchError::Ledger(
                page.message.unwrap_or_else(|| page.result.clone()),
            )
            .into());
        }
        Ok(page)
    }
}

#[async_trait]
impl LedgerSource for RippleLedgerClient {
    async fn fetch_transfers(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LedgerTransfer>> {
        let mut transfers = Vec::new();
        let mut marker: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let page = self.fetch_page(from, to, marker.as_deref()).await?;
            debug!(
                page = page_number,
                payments = page.payments.len(),
                "Ledger page fetched"
            );

            transfers.extend(
                page.payments
                    .into_iter()
                    .map(LedgerTransfer::from)
                    .filter(|t| t.is_asset(&self.asset)),
            );

            match page.marker {
                Some(next) if !next.is_empty() => marker = Some(next),
                _ => return Ok(transfers),
            }
        }

        Err(FetchError::Ledger(format!("more than {MAX_PAGES} pages for one window")).into())
    }
}
