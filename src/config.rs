//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. Every section is optional and
//! falls back to defaults; an empty `[[exchanges]]` list selects the
//! built-in catalog. `DATABASE_URL` in the environment overrides
//! `database.path`.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::application::{MatchSettings, SchedulerSettings};
use crate::domain::{Address, Exchange, ExchangeRegistry, Fiat};
use crate::error::{ConfigError, Result};

/// Environment variable overriding `database.path`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Upper bound for settings given in seconds: one day.
pub const MAX_SECS: u64 = 24 * 60 * 60;

/// Upper bound for settings given in minutes: one week.
pub const MAX_MINS: u64 = 7 * 24 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub rate: RateConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    /// Exchange catalog; empty selects [`builtin_exchanges`].
    #[serde(default)]
    pub exchanges: Vec<ExchangeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    /// Length of the first window after startup.
    #[serde(default = "default_initial_lookback_mins")]
    pub initial_lookback_mins: u64,
}

const fn default_interval_secs() -> u64 {
    30
}

const fn default_backoff_secs() -> u64 {
    30
}

const fn default_initial_lookback_mins() -> u64 {
    20
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            backoff_secs: default_backoff_secs(),
            initial_lookback_mins: default_initial_lookback_mins(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_bridge_asset")]
    pub bridge_asset: String,
    #[serde(default = "default_trade_lookback_mins")]
    pub trade_lookback_mins: u64,
    #[serde(default = "default_ledger_offset_mins")]
    pub ledger_offset_mins: u64,
    #[serde(default = "default_end_to_end_deltas_secs")]
    pub end_to_end_deltas_secs: Vec<u64>,
    #[serde(default = "default_side_window_secs")]
    pub inbound_window_secs: u64,
    #[serde(default = "default_side_window_secs")]
    pub outbound_window_secs: u64,
    /// Poll only exchanges flagged `confirmed`.
    #[serde(default = "default_true")]
    pub confirmed_sources_only: bool,
}

fn default_bridge_asset() -> String {
    "XRP".into()
}

const fn default_trade_lookback_mins() -> u64 {
    12
}

const fn default_ledger_offset_mins() -> u64 {
    5
}

fn default_end_to_end_deltas_secs() -> Vec<u64> {
    vec![30, 60, 120, 300]
}

const fn default_side_window_secs() -> u64 {
    120
}

const fn default_true() -> bool {
    true
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            bridge_asset: default_bridge_asset(),
            trade_lookback_mins: default_trade_lookback_mins(),
            ledger_offset_mins: default_ledger_offset_mins(),
            end_to_end_deltas_secs: default_end_to_end_deltas_secs(),
            inbound_window_secs: default_side_window_secs(),
            outbound_window_secs: default_side_window_secs(),
            confirmed_sources_only: default_true(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

fn default_ledger_url() -> String {
    "https://data.ripple.com/v2".into()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_page_limit() -> u32 {
    1000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            api_url: default_ledger_url(),
            timeout_secs: default_timeout_secs(),
            page_limit: default_page_limit(),
        }
    }
}

/// Reference rate: last price of a Bitstamp book quoted in USD.
#[derive(Debug, Clone, Deserialize)]
pub struct RateConfig {
    #[serde(default = "default_bitstamp_url")]
    pub api_url: String,
    #[serde(default = "default_rate_pair")]
    pub pair: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_bitstamp_url() -> String {
    crate::adapter::bitstamp::DEFAULT_API_URL.into()
}

fn default_rate_pair() -> String {
    "xrpusd".into()
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            api_url: default_bitstamp_url(),
            pair: default_rate_pair(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file; unset keeps events in memory only.
    #[serde(default)]
    pub path: Option<String>,
}

/// Where published events go besides the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Log every published event.
    #[serde(default = "default_true")]
    pub log: bool,
    /// Enables the live broadcast channel with this per-subscriber buffer.
    #[serde(default)]
    pub broadcast_capacity: Option<usize>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            log: default_true(),
            broadcast_capacity: None,
        }
    }
}

/// Supported trade feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Bitstamp,
    Bitso,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Exchange book or pair name, e.g. `xrpusd` or `xrp_mxn`.
    pub book: String,
    /// Overrides the feed's public API root.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExchangeConfig {
    pub id: String,
    pub name: String,
    pub fiat: Fiat,
    pub addresses: Vec<String>,
    #[serde(default)]
    pub confirmed: bool,
    /// Trade feed; absent means the exchange has no API.
    #[serde(default)]
    pub source: Option<SourceConfig>,
}

impl ExchangeConfig {
    fn to_exchange(&self) -> Exchange {
        Exchange::new(
            self.id.as_str(),
            self.name.as_str(),
            self.fiat,
            self.addresses.iter().map(|a| Address::from(a.as_str())).collect(),
        )
        .confirmed(self.confirmed)
        .with_api(self.source.is_some())
    }
}

fn bitstamp_book(id: &str, fiat: Fiat, pair: &str) -> ExchangeConfig {
    ExchangeConfig {
        id: id.into(),
        name: "Bitstamp".into(),
        fiat,
        addresses: vec!["rDsbeomae4FXwgQTJp9Rs64Qg9vDiTCdBv".into()],
        confirmed: true,
        source: Some(SourceConfig {
            kind: SourceKind::Bitstamp,
            book: pair.into(),
            api_url: None,
            timeout_secs: default_timeout_secs(),
        }),
    }
}

/// Exchanges known to participate in bridge corridors.
pub fn builtin_exchanges() -> Vec<ExchangeConfig> {
    vec![
        bitstamp_book("bitstamp-usd", Fiat::Usd, "xrpusd"),
        bitstamp_book("bitstamp-eur", Fiat::Eur, "xrpeur"),
        ExchangeConfig {
            id: "bitso".into(),
            name: "Bitso".into(),
            fiat: Fiat::Mxn,
            addresses: vec!["rG6FZ31hDHN1K5Dkbma3PSB5uVCuVVRzfn".into()],
            confirmed: true,
            source: Some(SourceConfig {
                kind: SourceKind::Bitso,
                book: "xrp_mxn".into(),
                api_url: None,
                timeout_secs: default_timeout_secs(),
            }),
        },
        ExchangeConfig {
            id: "coins-ph".into(),
            name: "Coins.ph".into(),
            fiat: Fiat::Php,
            addresses: vec!["rU2mEJSLqBRkYLVTv55rFTgQajkLTnT6mA".into()],
            confirmed: true,
            source: None,
        },
        ExchangeConfig {
            id: "btc-markets".into(),
            name: "BTC Markets".into(),
            fiat: Fiat::Aud,
            addresses: vec!["rL3ggCUKaiR1iywkGW6PACbn3Y8g5edWiY".into()],
            confirmed: true,
            source: None,
        },
    ]
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config = Self::parse(&content)?;

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.is_empty() {
                config.database.path = Some(url);
            }
        }

        Ok(config)
    }

    /// Parse and validate TOML content.
    #[allow(clippy::result_large_err)]
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        fn positive(field: &'static str, value: u64) -> std::result::Result<(), ConfigError> {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".into(),
                });
            }
            Ok(())
        }

        fn at_most(
            field: &'static str,
            value: u64,
            max: u64,
        ) -> std::result::Result<(), ConfigError> {
            if value > max {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be at most {max}"),
                });
            }
            Ok(())
        }

        fn secs(field: &'static str, value: u64) -> std::result::Result<(), ConfigError> {
            positive(field, value)?;
            at_most(field, value, MAX_SECS)
        }

        fn mins(field: &'static str, value: u64) -> std::result::Result<(), ConfigError> {
            positive(field, value)?;
            at_most(field, value, MAX_MINS)
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected pretty or json, got {}", self.logging.format),
            }
            .into());
        }

        secs("scheduler.interval_secs", self.scheduler.interval_secs)?;
        secs("scheduler.backoff_secs", self.scheduler.backoff_secs)?;
        mins("scheduler.initial_lookback_mins", self.scheduler.initial_lookback_mins)?;
        mins("matching.trade_lookback_mins", self.matching.trade_lookback_mins)?;
        at_most("matching.ledger_offset_mins", self.matching.ledger_offset_mins, MAX_MINS)?;
        secs("matching.inbound_window_secs", self.matching.inbound_window_secs)?;
        secs("matching.outbound_window_secs", self.matching.outbound_window_secs)?;
        secs("ledger.timeout_secs", self.ledger.timeout_secs)?;
        positive("ledger.page_limit", u64::from(self.ledger.page_limit))?;
        secs("rate.timeout_secs", self.rate.timeout_secs)?;
        if self.notifier.broadcast_capacity == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "notifier.broadcast_capacity",
                reason: "must be greater than zero".into(),
            }
            .into());
        }

        if self.matching.bridge_asset.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "matching.bridge_asset",
            }
            .into());
        }
        if self.matching.end_to_end_deltas_secs.is_empty() {
            return Err(ConfigError::MissingField {
                field: "matching.end_to_end_deltas_secs",
            }
            .into());
        }
        for delta in &self.matching.end_to_end_deltas_secs {
            secs("matching.end_to_end_deltas_secs", *delta)?;
        }
        if self.ledger.api_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "ledger.api_url",
            }
            .into());
        }
        if self.rate.pair.is_empty() {
            return Err(ConfigError::MissingField { field: "rate.pair" }.into());
        }

        let mut ids = HashSet::new();
        for exchange in &self.exchanges {
            if !ids.insert(exchange.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "exchanges.id",
                    reason: format!("duplicate exchange id {}", exchange.id),
                }
                .into());
            }
            if exchange.addresses.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "exchanges.addresses",
                    reason: format!("exchange {} has no addresses", exchange.id),
                }
                .into());
            }
            if let Some(source) = &exchange.source {
                if source.book.is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "exchanges.source.book",
                    }
                    .into());
                }
                secs("exchanges.source.timeout_secs", source.timeout_secs)?;
            }
        }

        Ok(())
    }

    /// Configured exchanges, or the built-in catalog if none are listed.
    pub fn exchanges(&self) -> Vec<ExchangeConfig> {
        if self.exchanges.is_empty() {
            builtin_exchanges()
        } else {
            self.exchanges.clone()
        }
    }

    /// Build the exchange registry from [`Config::exchanges`].
    ///
    /// # Errors
    /// Returns an error if an id repeats or an exchange has no address.
    pub fn build_registry(&self) -> Result<ExchangeRegistry> {
        let exchanges = self.exchanges().iter().map(ExchangeConfig::to_exchange).collect();
        Ok(ExchangeRegistry::new(exchanges)?)
    }

    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            interval: seconds(self.scheduler.interval_secs),
            backoff: seconds(self.scheduler.backoff_secs),
            initial_lookback: minutes(self.scheduler.initial_lookback_mins),
        }
    }

    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            trade_lookback: minutes(self.matching.trade_lookback_mins),
            ledger_offset: minutes(self.matching.ledger_offset_mins),
            end_to_end_deltas: self
                .matching
                .end_to_end_deltas_secs
                .iter()
                .map(|s| seconds(*s))
                .collect(),
            inbound_window: seconds(self.matching.inbound_window_secs),
            outbound_window: seconds(self.matching.outbound_window_secs),
        }
    }

    pub fn ledger_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.ledger.timeout_secs)
    }

    pub fn rate_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.rate.timeout_secs)
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

// Clamped so unvalidated values cannot overflow chrono.
fn seconds(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value.min(MAX_MINS * 60)).unwrap_or_default())
}

fn minutes(value: u64) -> Duration {
    seconds(value.saturating_mul(60))
}
