//! Persistence port for corridor events.

use async_trait::async_trait;

use crate::domain::{CorridorEvent, Stats};
use crate::error::Result;

/// Storage for detected corridor events.
///
/// `save` must be idempotent on the transaction hash and safe under
/// concurrent callers: of any number of saves of the same hash, exactly one
/// returns `true`.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist `event`. Returns `false` if its hash was already stored.
    async fn save(&self, event: &CorridorEvent) -> Result<bool>;

    /// Aggregate stats over everything persisted, `None` if empty.
    async fn calculate_stats(&self) -> Result<Option<Stats>>;

    /// Most recent events, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<CorridorEvent>>;
}
