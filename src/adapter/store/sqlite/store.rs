//! SQLite event store implementation.
//!
//! Deduplication relies on the `UNIQUE` constraint on `tx_hash`:
//! `INSERT OR IGNORE` affects one row for the first save of a hash and
//! none afterwards, so concurrent saves from separate connections still
//! produce exactly one winner.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::sql_types::Text;

use super::connection::{create_pool, run_migrations, DbPool};
use super::model::{encode_time, CorridorEventRow, CorridorRow, NewCorridorEventRow, TotalsRow};
use super::schema::corridor_events;
use crate::domain::{CorridorEvent, CorridorVolume, ExchangeId, Stats};
use crate::error::{Error, Result};
use crate::port::EventStore;

const TOTALS_QUERY: &str = "\
SELECT COUNT(*) AS event_count, \
       COALESCE(SUM(CASE WHEN confirmed THEN 1 ELSE 0 END), 0) AS confirmed_count, \
       COALESCE(SUM(amount), 0.0) AS bridge_volume, \
       COALESCE(SUM(usd_value), 0.0) AS usd_volume, \
       COALESCE(SUM(CASE WHEN timestamp > ? THEN usd_value ELSE 0.0 END), 0.0) AS usd_volume_24h, \
       MAX(timestamp) AS last_event_at \
FROM corridor_events";

const CORRIDORS_QUERY: &str = "\
SELECT source, destination, COUNT(*) AS count, SUM(usd_value) AS usd_value \
FROM corridor_events \
GROUP BY source, destination \
ORDER BY usd_value DESC, source, destination";

/// SQLite-backed event store.
pub struct SqliteEventStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteEventStore {
    /// Create a store over an already migrated pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database at `url` and apply migrations.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be built or migrations fail.
    pub fn open(url: &str) -> Result<Self> {
        let pool = create_pool(url)?;
        run_migrations(&pool)?;
        Ok(Self::new(pool))
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn save(&self, event: &CorridorEvent) -> Result<bool> {
        let row = NewCorridorEventRow::from(event);
        let mut conn = self.conn()?;

        let inserted = diesel::insert_or_ignore_into(corridor_events::table)
            .values(&row)
            .execute(&mut conn)?;

        Ok(inserted == 1)
    }

    async fn calculate_stats(&self) -> Result<Option<Stats>> {
        let mut conn = self.conn()?;
        let cutoff = encode_time(Utc::now() - Duration::hours(24));

        let totals: TotalsRow = diesel::sql_query(TOTALS_QUERY)
            .bind::<Text, _>(cutoff)
            .get_result(&mut conn)?;
        if totals.event_count == 0 {
            return Ok(None);
        }

        let corridors = diesel::sql_query(CORRIDORS_QUERY)
            .load::<CorridorRow>(&mut conn)?
            .into_iter()
            .map(|row| CorridorVolume {
                source: ExchangeId::from(row.source),
                destination: ExchangeId::from(row.destination),
                count: u64::try_from(row.count).unwrap_or_default(),
                usd_value: row.usd_value,
            })
            .collect();

        Ok(Some(Stats {
            event_count: u64::try_from(totals.event_count).unwrap_or_default(),
            confirmed_count: u64::try_from(totals.confirmed_count).unwrap_or_default(),
            bridge_volume: totals.bridge_volume,
            usd_volume: totals.usd_volume,
            usd_volume_24h: totals.usd_volume_24h,
            corridors,
            last_event_at: totals.last_event_at()?,
        }))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<CorridorEvent>> {
        let mut conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        corridor_events::table
            .order(corridor_events::timestamp.desc())
            .limit(limit)
            .select(CorridorEventRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(CorridorEvent::try_from)
            .collect()
    }
}
