//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for the log, a live broadcast
//! channel, and a fan-out registry over any number of notifiers.

mod broadcast;

pub use broadcast::{BroadcastNotifier, Published};

use tracing::info;

use crate::port::{Event, Notifier};

/// Registry of notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NotifierRegistry {
    fn notify(&self, event: Event) {
        self.notify_all(event);
    }
}

/// A no-op notifier for when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        match event {
            Event::Corridor(e) => {
                info!(
                    topic = crate::port::EVENT_TOPIC,
                    tx_hash = %e.tx_hash,
                    corridor = %e.corridor(),
                    usd_value = e.usd_value,
                    confirmed = e.confirmed,
                    "Corridor event published"
                );
            }
            Event::Stats(s) => {
                info!(
                    topic = crate::port::STATS_TOPIC,
                    events = s.event_count,
                    usd_volume = s.usd_volume,
                    usd_volume_24h = s.usd_volume_24h,
                    corridors = s.corridors.len(),
                    "Stats published"
                );
            }
        }
    }
}
