//! In-process bus for locally generated events.
//!
//! Some state changes originate on this device rather than at the backend
//! (drafts, local-only settings, optimistic updates). They go through the
//! same processing path as remote events but never touch the checkpoint:
//! local envelopes are always transient and always sourced live.
//!
//! The bus is a bounded broadcast channel. Emitters never block; when a
//! subscriber falls behind by more than the bus capacity, the oldest
//! undelivered envelopes are dropped for that subscriber and the loss is
//! logged. Subscribers only see envelopes emitted after they subscribed.

use tokio::sync::broadcast;

use msgsync_types::{Event, EventEnvelope};

/// Broadcast bus for locally generated events.
///
/// Cloning is cheap and clones share the same channel.
#[derive(Debug, Clone)]
pub struct LocalEventBus {
    sender: broadcast::Sender<EventEnvelope>,
    capacity: usize,
}

impl LocalEventBus {
    /// Create a bus buffering up to `capacity` envelopes per subscriber.
    ///
    /// The underlying channel only supports power-of-two capacities, so
    /// the requested value is normalized up front (next power of two,
    /// minimum 1) and [`capacity`](Self::capacity) reports the effective
    /// bound. A subscriber that falls behind by more than that bound
    /// loses exactly the oldest envelopes.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.next_power_of_two();
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Effective per-subscriber buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Publish a locally generated event.
    ///
    /// Never blocks and never fails: with no active subscribers the
    /// envelope is simply dropped, matching fire-and-forget semantics.
    pub fn emit(&self, event: Event) {
        let envelope = EventEnvelope::local(event);
        tracing::debug!(event_id = %envelope.event.id, "emitting local event");
        // An Err here only means there are no subscribers right now.
        let _ = self.sender.send(envelope);
    }

    /// Subscribe to envelopes emitted from this point on.
    pub fn subscribe(&self) -> LocalEventSubscription {
        LocalEventSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A subscriber's end of the local event bus.
pub struct LocalEventSubscription {
    receiver: broadcast::Receiver<EventEnvelope>,
}

impl LocalEventSubscription {
    /// Receive the next envelope.
    ///
    /// If this subscriber lagged past the bus capacity, the skipped
    /// envelopes are logged and delivery resumes with the oldest retained
    /// one. Returns None once the bus has been dropped and the buffer is
    /// drained.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "local event subscriber lagged, dropping oldest");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
