//! In-memory event store.
//!
//! Used when no database is configured, and in tests. Deduplication is a
//! `DashMap` keyed by transaction hash; the entry API makes the
//! check-and-insert atomic per hash.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::domain::{CorridorEvent, Stats, TxHash};
use crate::error::Result;
use crate::port::EventStore;

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    seen: DashMap<TxHash, usize>,
    events: RwLock<Vec<CorridorEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn save(&self, event: &CorridorEvent) -> Result<bool> {
        match self.seen.entry(event.tx_hash.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                let mut events = self.events.write();
                slot.insert(events.len());
                events.push(event.clone());
                Ok(true)
            }
        }
    }

    async fn calculate_stats(&self) -> Result<Option<Stats>> {
        Ok(Stats::from_events(self.events.read().iter(), Utc::now()))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<CorridorEvent>> {
        let mut events = self.events.read().clone();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);
        Ok(events)
    }
}
