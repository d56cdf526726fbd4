//! The event processor seam.
//!
//! Applying an event to domain state is the business logic of the
//! surrounding app; this crate only defines the contract both consumer
//! loops invoke, plus a recording mock for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use msgsync_types::{EventEnvelope, EventId, ProcessingFailure};

/// Applies one event to domain state.
///
/// Invoked strictly sequentially per consumer loop; implementations should
/// be idempotent for duplicate event ids (the live channel may redeliver).
#[async_trait]
pub trait EventProcessor: Send + Sync {
    /// Process one envelope. A returned failure is fatal for the remote
    /// pipeline and logged-and-skipped by the local pipeline.
    async fn process(&self, envelope: &EventEnvelope) -> Result<(), ProcessingFailure>;
}

/// Recording processor for tests.
///
/// Captures every envelope it is handed, in order, and can be told to
/// reject specific event ids.
#[derive(Debug, Default)]
pub struct RecordingProcessor {
    inner: Arc<Mutex<RecordingInner>>,
}

#[derive(Debug, Default)]
struct RecordingInner {
    processed: Vec<EventEnvelope>,
    fail_ids: Vec<EventId>,
}

impl RecordingProcessor {
    /// Create a new recording processor that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any envelope carrying this event id.
    pub fn fail_on(&self, id: EventId) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_ids.push(id);
    }

    /// All envelopes processed so far, in order.
    pub fn processed(&self) -> Vec<EventEnvelope> {
        let inner = self.inner.lock().unwrap();
        inner.processed.clone()
    }

    /// Ids of all events successfully processed so far, in order.
    pub fn processed_ids(&self) -> Vec<EventId> {
        let inner = self.inner.lock().unwrap();
        inner.processed.iter().map(|e| e.event.id.clone()).collect()
    }
}

impl Clone for RecordingProcessor {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl EventProcessor for RecordingProcessor {
    async fn process(&self, envelope: &EventEnvelope) -> Result<(), ProcessingFailure> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_ids.contains(&envelope.event.id) {
            return Err(ProcessingFailure::new(
                envelope.event.id.clone(),
                "rejected by test processor",
            ));
        }
        inner.processed.push(envelope.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgsync_types::Event;

    fn envelope(id: &str) -> EventEnvelope {
        EventEnvelope::live(Event::new(EventId::new(id), serde_json::Value::Null))
    }

    #[tokio::test]
    async fn records_in_order() {
        let processor = RecordingProcessor::new();
        processor.process(&envelope("e1")).await.unwrap();
        processor.process(&envelope("e2")).await.unwrap();

        assert_eq!(
            processor.processed_ids(),
            vec![EventId::new("e1"), EventId::new("e2")]
        );
    }

    #[tokio::test]
    async fn rejects_configured_ids() {
        let processor = RecordingProcessor::new();
        processor.fail_on(EventId::new("e2"));

        processor.process(&envelope("e1")).await.unwrap();
        let err = processor.process(&envelope("e2")).await.unwrap_err();

        assert_eq!(err.event_id, EventId::new("e2"));
        assert_eq!(processor.processed_ids(), vec![EventId::new("e1")]);
    }

    #[tokio::test]
    async fn clone_shares_recordings() {
        let processor = RecordingProcessor::new();
        let observer = processor.clone();
        processor.process(&envelope("e1")).await.unwrap();
        assert_eq!(observer.processed_ids(), vec![EventId::new("e1")]);
    }
}
