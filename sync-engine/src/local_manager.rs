//! Consumer loop for locally generated events.
//!
//! Runs independently of remote sync and follows the opposite failure
//! policy: a rejected local event is logged and skipped, never fatal.
//! Local events are best-effort by construction (transient, no
//! checkpoint), so one bad envelope must not wedge the device's own
//! updates.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::local_bus::{LocalEventBus, LocalEventSubscription};
use crate::processor::EventProcessor;

/// Drains the local event bus into the processor.
pub struct LocalEventManager<P> {
    subscription: LocalEventSubscription,
    processor: Arc<P>,
    cancel: CancellationToken,
}

impl<P> LocalEventManager<P>
where
    P: EventProcessor,
{
    /// Subscribe to the bus and prepare a consumer loop.
    ///
    /// Subscribing happens here, not in [`run`](Self::run): events emitted
    /// between construction and the loop starting are buffered, not lost.
    pub fn new(bus: &LocalEventBus, processor: Arc<P>) -> Self {
        Self {
            subscription: bus.subscribe(),
            processor,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Process local events until the bus closes or the token fires.
    pub async fn run(mut self) {
        loop {
            let envelope = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!("local event loop cancelled");
                    return;
                }
                envelope = self.subscription.next() => envelope,
            };

            let Some(envelope) = envelope else {
                tracing::info!("local event bus closed");
                return;
            };

            if let Err(e) = self.processor.process(&envelope).await {
                // Log and move on; local delivery is best-effort.
                tracing::error!(event_id = %envelope.event.id, error = %e, "local event rejected, skipping");
            }
        }
    }
}
