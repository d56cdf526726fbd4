//! Engine-level failure taxonomy.

use thiserror::Error;

use crate::checkpoint::StorageError;
use crate::sources::SourceError;
use msgsync_types::ProcessingFailure;

/// A failure that stops the remote sync pipeline.
///
/// Nothing here is retried internally: the failure is published through
/// the sync status and the policy layer above decides whether to restart
/// the pipeline.
#[derive(Debug, Error)]
pub enum SyncFailure {
    /// A page fetch or live channel operation failed.
    #[error("transport failure: {0}")]
    Transport(#[from] SourceError),

    /// The checkpoint store failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// The event processor rejected an event. Skipping it would leave a
    /// gap in ordered history, so the pipeline stops.
    #[error("processing failure: {0}")]
    Processing(#[from] ProcessingFailure),

    /// The backend returned an inconsistent page (e.g. `has_more` with
    /// zero events). Treated like a transport failure so the pipeline
    /// never loops on it.
    #[error("malformed page: {detail}")]
    MalformedPage {
        /// What was inconsistent about the page.
        detail: String,
    },

    /// A state machine invariant was violated. Indicates a bug in the
    /// engine, not in the backend.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_source_errors() {
        let failure: SyncFailure = SourceError::Timeout.into();
        assert!(matches!(failure, SyncFailure::Transport(_)));
        assert_eq!(failure.to_string(), "transport failure: operation timed out");
    }

    #[test]
    fn wraps_processing_failures() {
        let failure: SyncFailure =
            ProcessingFailure::new(msgsync_types::EventId::new("e7"), "bad payload").into();
        assert!(matches!(failure, SyncFailure::Processing(_)));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncFailure>();
    }
}
