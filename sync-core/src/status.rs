//! Sync status published by the incremental sync manager.

use std::fmt;

use msgsync_types::EventId;

/// Where incremental sync currently stands.
///
/// Owned by the sync manager, observed by other subsystems (periodic
/// background checks, UI indicators) that must only act while live.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// No sync attempt in progress yet.
    #[default]
    Pending,
    /// Fetching events missed while offline.
    CatchingUp,
    /// Caught up; events now arrive in real time.
    Live {
        /// Newest event id fetched during catch-up, None if there were
        /// no pending events.
        last_event_id: Option<EventId>,
    },
    /// The sync attempt failed and stopped consuming.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
}

impl SyncStatus {
    /// Check if events are being delivered in real time.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    /// Check if the sync attempt has failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::CatchingUp => write!(f, "catching-up"),
            Self::Live { last_event_id } => match last_event_id {
                Some(id) => write!(f, "live (last event {})", id),
                None => write!(f, "live (no pending events)"),
            },
            Self::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(SyncStatus::default(), SyncStatus::Pending);
    }

    #[test]
    fn is_live_helper() {
        assert!(!SyncStatus::Pending.is_live());
        assert!(!SyncStatus::CatchingUp.is_live());
        assert!(SyncStatus::Live {
            last_event_id: None
        }
        .is_live());
        assert!(!SyncStatus::Failed {
            reason: "boom".into()
        }
        .is_live());
    }

    #[test]
    fn is_failed_helper() {
        assert!(SyncStatus::Failed {
            reason: "boom".into()
        }
        .is_failed());
        assert!(!SyncStatus::CatchingUp.is_failed());
    }

    #[test]
    fn display_is_human_readable() {
        let status = SyncStatus::Live {
            last_event_id: Some(EventId::new("e9")),
        };
        assert_eq!(status.to_string(), "live (last event e9)");
        assert_eq!(SyncStatus::CatchingUp.to_string(), "catching-up");
    }
}
