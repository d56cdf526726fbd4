//! Domain events and catch-up pages.

use serde::{Deserialize, Serialize};

use crate::EventId;

/// An opaque, immutable unit of change.
///
/// Created by a transport collaborator when data arrives (or by a local
/// producer as a side effect of an API call). The payload schema belongs to
/// the event processor; this core never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Backend-assigned identifier, stable across redeliveries.
    pub id: EventId,
    /// Decoded event payload (external schema).
    pub payload: serde_json::Value,
    /// True for ephemeral signals that must not be persisted as history
    /// (e.g. typing indicators).
    pub transient: bool,
}

impl Event {
    /// Create a new durable event.
    pub fn new(id: EventId, payload: serde_json::Value) -> Self {
        Self {
            id,
            payload,
            transient: false,
        }
    }

    /// Create a new transient event (acted upon but not retained).
    pub fn transient(id: EventId, payload: serde_json::Value) -> Self {
        Self {
            id,
            payload,
            transient: true,
        }
    }
}

/// One page of the paginated catch-up channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPage {
    /// Events in backend order, oldest first.
    pub events: Vec<Event>,
    /// True if more pages are pending after this one.
    pub has_more: bool,
}

impl EventPage {
    /// Create a page.
    pub fn new(events: Vec<Event>, has_more: bool) -> Self {
        Self { events, has_more }
    }

    /// A terminal empty page (no pending events).
    pub fn empty() -> Self {
        Self {
            events: Vec::new(),
            has_more: false,
        }
    }

    /// Id of the last event in this page, if any.
    pub fn last_event_id(&self) -> Option<&EventId> {
        self.events.last().map(|e| &e.id)
    }
}
