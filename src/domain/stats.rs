//! Aggregate statistics over persisted corridor events.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::corridor::CorridorEvent;
use super::id::ExchangeId;

/// Totals for one (source, destination) exchange pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorridorVolume {
    pub source: ExchangeId,
    pub destination: ExchangeId,
    pub count: u64,
    pub usd_value: f64,
}

/// Aggregate view pushed to live subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub event_count: u64,
    pub confirmed_count: u64,
    /// Total delivered amount in bridge-asset units.
    pub bridge_volume: f64,
    pub usd_volume: f64,
    pub usd_volume_24h: f64,
    /// Sorted by USD volume, largest first.
    pub corridors: Vec<CorridorVolume>,
    pub last_event_at: Option<DateTime<Utc>>,
}

impl Stats {
    /// Summarize `events` as of `now`. Returns `None` for an empty set.
    #[must_use]
    pub fn from_events<'a, I>(events: I, now: DateTime<Utc>) -> Option<Self>
    where
        I: IntoIterator<Item = &'a CorridorEvent>,
    {
        let day_ago = now - Duration::hours(24);
        let mut stats = Stats {
            event_count: 0,
            confirmed_count: 0,
            bridge_volume: 0.0,
            usd_volume: 0.0,
            usd_volume_24h: 0.0,
            corridors: Vec::new(),
            last_event_at: None,
        };
        let mut corridors: HashMap<(ExchangeId, ExchangeId), CorridorVolume> = HashMap::new();

        for event in events {
            stats.event_count += 1;
            if event.confirmed {
                stats.confirmed_count += 1;
            }
            stats.bridge_volume += event.amount;
            stats.usd_volume += event.usd_value;
            if event.timestamp > day_ago {
                stats.usd_volume_24h += event.usd_value;
            }
            stats.last_event_at = stats.last_event_at.max(Some(event.timestamp));

            let entry = corridors
                .entry((event.source.clone(), event.destination.clone()))
                .or_insert_with(|| CorridorVolume {
                    source: event.source.clone(),
                    destination: event.destination.clone(),
                    count: 0,
                    usd_value: 0.0,
                });
            entry.count += 1;
            entry.usd_value += event.usd_value;
        }

        if stats.event_count == 0 {
            return None;
        }

        stats.corridors = corridors.into_values().collect();
        stats.corridors.sort_by(|a, b| {
            b.usd_value
                .total_cmp(&a.usd_value)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.destination.cmp(&b.destination))
        });

        Some(stats)
    }

    /// Share of events between verified participants, as a percentage.
    #[must_use]
    pub fn confirmed_rate(&self) -> Option<f64> {
        if self.event_count == 0 {
            None
        } else {
            Some(self.confirmed_count as f64 / self.event_count as f64 * 100.0)
        }
    }
}
