//! Duplicate suppression between catch-up and live delivery.
//!
//! The push channel replays recent events when it opens, so events fetched
//! during catch-up can arrive a second time on the live channel. This
//! module tracks the ids delivered during catch-up so the stream can skip
//! those replays without involving the event processor.

use std::collections::{HashSet, VecDeque};

use msgsync_types::EventId;

/// Ids delivered during the catch-up phase, in delivery order.
///
/// Consulted for every live payload. Once the live channel replays the
/// newest catch-up event, everything older has been replayed too and the
/// whole buffer can be dropped.
#[derive(Debug, Clone, Default)]
pub struct CatchUpBuffer {
    order: VecDeque<EventId>,
    ids: HashSet<EventId>,
}

impl CatchUpBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an id delivered during catch-up. Duplicate adds are ignored.
    pub fn add(&mut self, id: EventId) {
        if self.ids.insert(id.clone()) {
            self.order.push_back(id);
        }
    }

    /// Check whether an id was delivered during catch-up.
    pub fn contains(&self, id: &EventId) -> bool {
        self.ids.contains(id)
    }

    /// Remove a single id. Returns true if it was present.
    pub fn remove(&mut self, id: &EventId) -> bool {
        if self.ids.remove(id) {
            self.order.retain(|buffered| buffered != id);
            true
        } else {
            false
        }
    }

    /// If `id` is the newest buffered id, clear the whole buffer and
    /// return true: the live channel has caught up with the catch-up tail.
    pub fn clear_if_newest(&mut self, id: &EventId) -> bool {
        if self.order.back() == Some(id) {
            self.clear();
            true
        } else {
            false
        }
    }

    /// Drop all buffered ids.
    pub fn clear(&mut self) {
        self.order.clear();
        self.ids.clear();
    }

    /// Number of buffered ids.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
