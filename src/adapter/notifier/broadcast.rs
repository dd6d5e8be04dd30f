//! Live fan-out of published events over a tokio broadcast channel.
//!
//! Subscribers receive `(topic, payload)` pairs where the payload is the
//! JSON encoding of the event body. Slow subscribers lag and lose messages;
//! the detection pipeline never waits on them.

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::warn;

use crate::port::{Event, Notifier};

/// One message on the live channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: &'static str,
    pub payload: Value,
}

/// Publishes events to every live subscriber.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Published>,
}

impl BroadcastNotifier {
    /// Create a notifier buffering up to `capacity` messages per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Published> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, event: Event) {
        let topic = event.topic();
        let payload = match &event {
            Event::Corridor(e) => serde_json::to_value(e),
            Event::Stats(s) => serde_json::to_value(s),
        };

        match payload {
            // No receivers is fine.
            Ok(payload) => {
                let _ = self.tx.send(Published { topic, payload });
            }
            Err(e) => warn!(topic, error = %e, "Failed to encode event"),
        }
    }
}
