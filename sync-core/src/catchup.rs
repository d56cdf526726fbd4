//! Catch-up progress tracking - NO I/O, just state transitions.
//!
//! This module provides the pure state machine behind the remote event
//! stream: which phase the stream is in (initial, catching up, live,
//! closed), where the pagination cursor stands, and when the switch to
//! live delivery happens.
//!
//! The actual I/O (page fetches, live channel reads) is performed by
//! sync-engine, not by this module. This enables instant unit testing
//! without network mocks.

use thiserror::Error;

use msgsync_types::EventId;

/// The phase of the remote event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchUpPhase {
    /// No connection attempted.
    Initial,
    /// Live channel open; draining pending history page by page.
    CatchingUp,
    /// All pending pages drained; forwarding live pushes.
    Live,
    /// The stream ended (channel closed or a fetch failed).
    Closed,
}

/// Outcome of accepting one catch-up page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// More pages pending; fetch the next one from `cursor`.
    Continue {
        /// Cursor for the next page request.
        cursor: EventId,
    },
    /// No more pages; the stream switches to live delivery.
    CaughtUp {
        /// Newest event id seen during catch-up, None if no pending
        /// events existed.
        last_event_id: Option<EventId>,
    },
}

/// Invalid inputs to the progress machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    /// The live channel signalled open while not in the initial phase.
    #[error("channel opened in {phase:?} phase")]
    AlreadyOpened {
        /// Phase at the time of the signal.
        phase: CatchUpPhase,
    },

    /// A page was accepted outside the catching-up phase.
    #[error("page accepted in {phase:?} phase")]
    NotCatchingUp {
        /// Phase at the time of the page.
        phase: CatchUpPhase,
    },

    /// The backend flagged `has_more` on a page with zero events. The
    /// cursor cannot advance, so looping would never terminate.
    #[error("page flagged has_more with zero events")]
    EmptyPageWithMore,
}

/// Pure progress tracker for one catch-up attempt.
///
/// Driven by sync-engine: `channel_opened` when the live channel signals
/// open, `page_accepted` after the consumer has taken delivery of a full
/// page, `closed` when the stream ends. The cursor only ever advances past
/// fully delivered pages.
#[derive(Debug, Clone)]
pub struct CatchUpProgress {
    phase: CatchUpPhase,
    cursor: Option<EventId>,
    newest_seen: Option<EventId>,
}

impl CatchUpProgress {
    /// Create a tracker in the initial phase.
    pub fn new() -> Self {
        Self {
            phase: CatchUpPhase::Initial,
            cursor: None,
            newest_seen: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> CatchUpPhase {
        self.phase
    }

    /// Cursor for the next page request (None = full history).
    pub fn cursor(&self) -> Option<&EventId> {
        self.cursor.as_ref()
    }

    /// Newest event id seen during catch-up so far.
    pub fn newest_seen(&self) -> Option<&EventId> {
        self.newest_seen.as_ref()
    }

    /// Check if the stream is in live delivery.
    pub fn is_live(&self) -> bool {
        self.phase == CatchUpPhase::Live
    }

    /// The live channel signalled open: start catching up from the given
    /// checkpoint (None = full history).
    ///
    /// Only valid from the initial phase; there is no path from `Initial`
    /// straight to `Live`.
    pub fn channel_opened(&mut self, checkpoint: Option<EventId>) -> Result<(), ProgressError> {
        if self.phase != CatchUpPhase::Initial {
            return Err(ProgressError::AlreadyOpened { phase: self.phase });
        }
        self.phase = CatchUpPhase::CatchingUp;
        self.cursor = checkpoint;
        self.newest_seen = None;
        Ok(())
    }

    /// Record that the consumer has taken delivery of a full page.
    ///
    /// `last_id` is the id of the page's final event, `event_count` the
    /// number of events it carried. Advances the cursor past the page and
    /// decides whether to keep paging or switch to live. A short page
    /// (fewer events than the page size) with `has_more` still continues;
    /// only a zero-event page with `has_more` is rejected, because its
    /// cursor cannot advance.
    pub fn page_accepted(
        &mut self,
        last_id: Option<&EventId>,
        event_count: usize,
        has_more: bool,
    ) -> Result<PageOutcome, ProgressError> {
        if self.phase != CatchUpPhase::CatchingUp {
            return Err(ProgressError::NotCatchingUp { phase: self.phase });
        }
        if has_more && event_count == 0 {
            return Err(ProgressError::EmptyPageWithMore);
        }

        if let Some(last) = last_id {
            self.cursor = Some(last.clone());
            self.newest_seen = Some(last.clone());
        }

        if has_more {
            // Checked above: a has_more page always carries a last event.
            let cursor = self
                .cursor
                .clone()
                .ok_or(ProgressError::EmptyPageWithMore)?;
            Ok(PageOutcome::Continue { cursor })
        } else {
            self.phase = CatchUpPhase::Live;
            Ok(PageOutcome::CaughtUp {
                last_event_id: self.newest_seen.clone(),
            })
        }
    }

    /// The stream ended: channel closed or a fetch failed.
    pub fn closed(&mut self) {
        self.phase = CatchUpPhase::Closed;
    }
}

impl Default for CatchUpProgress {
    fn default() -> Self {
        Self::new()
    }
}
