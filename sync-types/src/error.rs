//! Error types shared across the msgsync crates.

use thiserror::Error;

use crate::EventId;

/// The event processor rejected an event.
///
/// Fatal for the remote pipeline (skipping would leave a gap in ordered
/// history); logged-and-skipped by the local pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event {event_id} rejected by processor: {reason}")]
pub struct ProcessingFailure {
    /// Id of the rejected event.
    pub event_id: EventId,
    /// Human-readable cause, reported by the processor.
    pub reason: String,
}

impl ProcessingFailure {
    /// Create a new processing failure.
    pub fn new(event_id: EventId, reason: impl Into<String>) -> Self {
        Self {
            event_id,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_event_id_and_reason() {
        let failure = ProcessingFailure::new(EventId::new("e7"), "decrypt failed");
        assert_eq!(
            failure.to_string(),
            "event e7 rejected by processor: decrypt failed"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProcessingFailure>();
    }
}
