// In-process publish/subscribe for domain events. The bus is a broadcast
// channel of a tagged union, so subscriptions are checked at compile time
// instead of by runtime topic names.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Emitted once per successful approval. Ephemeral: consumed at least once
/// by live subscribers, never persisted.
#[derive(Debug, Clone)]
pub struct AthleteApproved {
    pub athlete_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl AthleteApproved {
    pub fn new(athlete_id: Uuid) -> Self {
        Self {
            athlete_id,
            occurred_at: Utc::now(),
        }
    }
}

/// Every domain event the bus can carry.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    AthleteApproved(AthleteApproved),
}

const DEFAULT_CAPACITY: usize = 256;

/// In-process event bus. Publishing never blocks the producer and never
/// fails it: with no live subscribers the event is simply dropped.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Returns the number of
    /// subscribers that received it.
    pub fn publish(&self, event: DomainEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!("domain event published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
