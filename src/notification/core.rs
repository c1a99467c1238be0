//! The events sent to subscribers and the channel that broadcasts them.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::database_id::TransactionId;

/// The number of events a slow subscriber may fall behind before it starts missing events.
pub const DEFAULT_CAPACITY: usize = 100;

/// The payload of a [Event::NewTransaction] event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    /// The ID of the new transaction.
    pub id: TransactionId,
    /// The amount of the new transaction.
    pub amount: f64,
}

/// A real-time event sent to every connected subscriber.
///
/// Serialized as `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Event {
    /// A transaction has been stored in the database.
    #[serde(rename = "new_transaction")]
    NewTransaction(TransactionEvent),
}

/// Broadcasts [Event]s to the subscribers connected at the time of publishing.
///
/// Delivery is at-most-once: events are not stored, replayed or acknowledged.
/// Cloning a `Notifier` gives another handle to the same channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Event>,
}

impl Notifier {
    /// Create a notifier where each subscriber buffers up to `capacity` events.
    ///
    /// A `capacity` of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));

        Self { sender }
    }

    /// Send `event` to every current subscriber.
    ///
    /// This never fails: having no subscribers is not an error for the caller.
    pub fn publish(&self, event: Event) {
        match self.sender.send(event) {
            Ok(subscriber_count) => {
                tracing::debug!("published event to {subscriber_count} subscriber(s)");
            }
            Err(_) => {
                tracing::debug!("no subscribers connected, event dropped");
            }
        }
    }

    /// Register a new subscriber.
    ///
    /// The receiver only sees events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// The number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
