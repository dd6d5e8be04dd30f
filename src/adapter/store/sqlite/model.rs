//! Database model types for Diesel ORM.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text};

use super::schema::corridor_events;
use crate::domain::{Address, CorridorEvent, ExchangeId, Fiat, SpottedAt, TxHash};
use crate::error::{Error, Result};

/// Fixed-width UTC encoding so that text order matches time order.
pub fn encode_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp {value}: {e}")))
}

/// Database row for a corridor event (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = corridor_events)]
pub struct NewCorridorEventRow {
    pub tx_hash: String,
    pub amount: f64,
    pub source: String,
    pub destination: String,
    pub source_fiat: String,
    pub destination_fiat: String,
    pub source_address: String,
    pub destination_address: String,
    pub tag: Option<i64>,
    pub timestamp: String,
    pub usd_value: f64,
    pub confirmed: bool,
    pub spotted_at: String,
}

impl From<&CorridorEvent> for NewCorridorEventRow {
    fn from(event: &CorridorEvent) -> Self {
        Self {
            tx_hash: event.tx_hash.to_string(),
            amount: event.amount,
            source: event.source.to_string(),
            destination: event.destination.to_string(),
            source_fiat: event.source_fiat.code().to_string(),
            destination_fiat: event.destination_fiat.code().to_string(),
            source_address: event.source_address.to_string(),
            destination_address: event.destination_address.to_string(),
            tag: event.tag.map(i64::from),
            timestamp: encode_time(event.timestamp),
            usd_value: event.usd_value,
            confirmed: event.confirmed,
            spotted_at: event.spotted_at.as_str().to_string(),
        }
    }
}

/// Database row for a corridor event (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = corridor_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CorridorEventRow {
    pub id: Option<i32>,
    pub tx_hash: String,
    pub amount: f64,
    pub source: String,
    pub destination: String,
    pub source_fiat: String,
    pub destination_fiat: String,
    pub source_address: String,
    pub destination_address: String,
    pub tag: Option<i64>,
    pub timestamp: String,
    pub usd_value: f64,
    pub confirmed: bool,
    pub spotted_at: String,
}

impl TryFrom<CorridorEventRow> for CorridorEvent {
    type Error = Error;

    fn try_from(row: CorridorEventRow) -> Result<Self> {
        let spotted_at = SpottedAt::parse(&row.spotted_at)
            .ok_or_else(|| Error::Parse(format!("spotted_at {}", row.spotted_at)))?;
        let tag = row
            .tag
            .map(u32::try_from)
            .transpose()
            .map_err(|e| Error::Parse(format!("tag: {e}")))?;

        Ok(CorridorEvent {
            amount: row.amount,
            source: ExchangeId::from(row.source),
            destination: ExchangeId::from(row.destination),
            source_fiat: row.source_fiat.parse::<Fiat>()?,
            destination_fiat: row.destination_fiat.parse::<Fiat>()?,
            source_address: Address::from(row.source_address),
            destination_address: Address::from(row.destination_address),
            tx_hash: TxHash::from(row.tx_hash),
            tag,
            timestamp: decode_time(&row.timestamp)?,
            usd_value: row.usd_value,
            confirmed: row.confirmed,
            spotted_at,
        })
    }
}

/// Whole-table aggregates.
#[derive(QueryableByName, Debug)]
pub struct TotalsRow {
    #[diesel(sql_type = BigInt)]
    pub event_count: i64,
    #[diesel(sql_type = BigInt)]
    pub confirmed_count: i64,
    #[diesel(sql_type = Double)]
    pub bridge_volume: f64,
    #[diesel(sql_type = Double)]
    pub usd_volume: f64,
    #[diesel(sql_type = Double)]
    pub usd_volume_24h: f64,
    #[diesel(sql_type = Nullable<Text>)]
    pub last_event_at: Option<String>,
}

impl TotalsRow {
    pub fn last_event_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.last_event_at.as_deref().map(decode_time).transpose()
    }
}

/// Per-corridor aggregates.
#[derive(QueryableByName, Debug)]
pub struct CorridorRow {
    #[diesel(sql_type = Text)]
    pub source: String,
    #[diesel(sql_type = Text)]
    pub destination: String,
    #[diesel(sql_type = BigInt)]
    pub count: i64,
    #[diesel(sql_type = Double)]
    pub usd_value: f64,
}
