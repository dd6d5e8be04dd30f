//! Notifier that records everything it is told.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{CorridorEvent, Stats};
use crate::port::{Event, Notifier};

/// Thread-safe event collector for notification assertions in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Published corridor events, in publish order.
    pub fn corridor_events(&self) -> Vec<CorridorEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Corridor(event) => Some((**event).clone()),
                Event::Stats(_) => None,
            })
            .collect()
    }

    /// Published stats, in publish order.
    pub fn stats(&self) -> Vec<Stats> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Stats(stats) => Some((**stats).clone()),
                Event::Corridor(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}
