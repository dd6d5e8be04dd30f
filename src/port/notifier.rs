//! Notifier port for live updates.
//!
//! Notifications are fire-and-forget: a notifier never reports failure back
//! to the detection pipeline.

use serde::Serialize;

use crate::domain::{CorridorEvent, Stats};

/// Topic carrying newly persisted corridor events.
pub const EVENT_TOPIC: &str = "event";

/// Topic carrying recomputed aggregate stats.
pub const STATS_TOPIC: &str = "stats";

/// Events that can trigger notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "topic", content = "payload")]
pub enum Event {
    /// A corridor event was persisted for the first time.
    #[serde(rename = "event")]
    Corridor(Box<CorridorEvent>),
    /// Stats were recomputed at the end of a cycle.
    #[serde(rename = "stats")]
    Stats(Box<Stats>),
}

impl Event {
    /// Topic this event is published on.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Event::Corridor(_) => EVENT_TOPIC,
            Event::Stats(_) => STATS_TOPIC,
        }
    }
}

impl From<CorridorEvent> for Event {
    fn from(event: CorridorEvent) -> Self {
        Event::Corridor(Box::new(event))
    }
}

impl From<Stats> for Event {
    fn from(stats: Stats) -> Self {
        Event::Stats(Box::new(stats))
    }
}

/// Trait for notification handlers.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}
