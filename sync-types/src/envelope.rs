//! EventEnvelope - an event plus metadata about where it came from and how
//! it should be treated.

use serde::{Deserialize, Serialize};

use crate::Event;

/// Which delivery mechanism produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    /// Pulled from the paginated catch-up channel.
    CatchUp,
    /// Pushed on the live channel (or generated locally).
    Live,
}

/// Delivery metadata attached to an event as it enters the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    /// Delivery mechanism.
    pub source: EventSource,
    /// True if the event must not be persisted as history.
    pub is_transient: bool,
}

/// An event wrapped with its [`DeliveryInfo`].
///
/// Created exactly once per event, at the moment the event is accepted into
/// the pipeline; consumed exactly once by a processor invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// The wrapped event.
    pub event: Event,
    /// Where the event came from and how to treat it.
    pub delivery: DeliveryInfo,
}

impl EventEnvelope {
    /// Wrap an event delivered by the catch-up channel.
    pub fn catch_up(event: Event) -> Self {
        let is_transient = event.transient;
        Self {
            event,
            delivery: DeliveryInfo {
                source: EventSource::CatchUp,
                is_transient,
            },
        }
    }

    /// Wrap an event pushed on the live channel.
    pub fn live(event: Event) -> Self {
        let is_transient = event.transient;
        Self {
            event,
            delivery: DeliveryInfo {
                source: EventSource::Live,
                is_transient,
            },
        }
    }

    /// Wrap a locally generated event.
    ///
    /// Local events never traversed the network: they are always transient
    /// and tagged as live, since they happen "now" by definition.
    pub fn local(event: Event) -> Self {
        Self {
            event,
            delivery: DeliveryInfo {
                source: EventSource::Live,
                is_transient: true,
            },
        }
    }

    /// Whether this envelope came from the catch-up channel.
    pub fn is_catch_up(&self) -> bool {
        self.delivery.source == EventSource::CatchUp
    }
}
