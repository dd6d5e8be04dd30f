//! Detected corridor usage.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fiat::Fiat;
use super::id::{Address, ExchangeId, TxHash};

/// Which side of a corridor produced corroborating trade evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpottedAt {
    Source,
    Destination,
    SourceAndDestination,
}

impl SpottedAt {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SpottedAt::Source => "SOURCE",
            SpottedAt::Destination => "DESTINATION",
            SpottedAt::SourceAndDestination => "SOURCE_AND_DESTINATION",
        }
    }

    /// Parse the persisted representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SOURCE" => Some(SpottedAt::Source),
            "DESTINATION" => Some(SpottedAt::Destination),
            "SOURCE_AND_DESTINATION" => Some(SpottedAt::SourceAndDestination),
            _ => None,
        }
    }
}

impl fmt::Display for SpottedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ledger transfer classified as probable corridor usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorEvent {
    /// Delivered amount in bridge-asset units.
    pub amount: f64,
    pub source: ExchangeId,
    pub destination: ExchangeId,
    pub source_fiat: Fiat,
    pub destination_fiat: Fiat,
    pub source_address: Address,
    pub destination_address: Address,
    pub tx_hash: TxHash,
    pub tag: Option<u32>,
    pub timestamp: DateTime<Utc>,
    /// `amount * rate` at detection time.
    pub usd_value: f64,
    /// Both endpoints are verified bridge participants.
    pub confirmed: bool,
    pub spotted_at: SpottedAt,
}

impl CorridorEvent {
    /// Human-readable corridor label, e.g. `EUR -> MXN`.
    #[must_use]
    pub fn corridor(&self) -> String {
        format!("{} -> {}", self.source_fiat, self.destination_fiat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spotted_at_round_trips_through_str() {
        for spotted in [
            SpottedAt::Source,
            SpottedAt::Destination,
            SpottedAt::SourceAndDestination,
        ] {
            assert_eq!(SpottedAt::parse(spotted.as_str()), Some(spotted));
        }
        assert_eq!(SpottedAt::parse("both"), None);
    }

    #[test]
    fn spotted_at_serializes_like_as_str() {
        let json = serde_json::to_string(&SpottedAt::SourceAndDestination).unwrap();
        assert_eq!(json, "\"SOURCE_AND_DESTINATION\"");
    }
}
