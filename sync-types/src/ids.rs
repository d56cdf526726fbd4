//! Identity and ordering types for msgsync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable identifier for a domain event.
///
/// Assigned by the backend when the event is created. Opaque to this core:
/// it is never parsed, only compared and persisted. In practice the backend
/// uses UUID-shaped strings, but nothing here depends on that.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create an EventId from a backend-provided string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a new random EventId (UUID v4 string).
    ///
    /// Used by local event producers and tests; remote events always carry
    /// backend-assigned ids.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.0)
    }
}

/// A unique identifier for this client instance.
///
/// Sent with every catch-up page request so the backend can scope pending
/// events to the requesting client. UUID v4 format (16 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(uuid::Uuid);

impl ClientId {
    /// Create a new random ClientId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create a ClientId from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        uuid::Uuid::from_slice(bytes).ok().map(Self)
    }

    /// Get the raw bytes of this ClientId.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_from_backend_string() {
        let id = EventId::new("evt-0001");
        assert_eq!(id.as_str(), "evt-0001");
        assert_eq!(id.to_string(), "evt-0001");
    }

    #[test]
    fn event_id_equality_is_by_value() {
        assert_eq!(EventId::new("a"), EventId::from("a"));
        assert_ne!(EventId::new("a"), EventId::new("b"));
    }

    #[test]
    fn event_id_random_is_unique() {
        assert_ne!(EventId::random(), EventId::random());
    }

    #[test]
    fn event_id_orders_lexicographically() {
        // Backend ids are ULID-like: lexicographic order follows creation order.
        let earlier = EventId::new("01H0000000000000000000000A");
        let later = EventId::new("01H0000000000000000000000B");
        assert!(earlier < later);
    }

    #[test]
    fn client_id_roundtrip() {
        let original = ClientId::new();
        let restored = ClientId::from_bytes(original.as_bytes()).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn client_id_from_invalid_length_fails() {
        assert!(ClientId::from_bytes(&[0u8; 7]).is_none());
    }
}
