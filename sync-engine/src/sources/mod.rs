//! Remote source abstractions for msgsync.
//!
//! This module provides the pluggable transport seams the engine pulls
//! events through (backend REST pagination, push channel, mocks for
//! testing).
//!
//! # Design
//!
//! Two traits, one per delivery mechanism:
//! - [`CatchUpSource`] - pull-based pagination over pending history
//! - [`LiveSource`] - a push channel with a connection lifecycle
//!
//! The reconnect/backoff policy belongs to the implementations, not to
//! this crate: the engine consumes one connection attempt as a unit and
//! surfaces its failure.

mod mock;

pub use mock::{MockCatchUpSource, MockLiveSource};

use async_trait::async_trait;
use thiserror::Error;

use msgsync_types::{ClientId, Event, EventId, EventPage};

/// Source-layer errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection attempt failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation attempted without a connection.
    #[error("not connected")]
    NotConnected,

    /// The live channel closed.
    #[error("channel closed: {}", cause.as_deref().unwrap_or("normal closure"))]
    ChannelClosed {
        /// Transport-reported cause, None for a normal closure.
        cause: Option<String>,
    },

    /// A page request failed.
    #[error("page request failed: {0}")]
    RequestFailed(String),

    /// Operation timed out.
    #[error("operation timed out")]
    Timeout,
}

/// One frame on the live channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveChannelEvent {
    /// The channel is open; events will follow.
    Opened,
    /// An event arrived.
    Payload(Event),
    /// The channel delivered something that is not an event frame.
    /// Logged and skipped; not an error.
    NonBinaryPayload,
    /// The channel closed, normally (no cause) or abnormally.
    Closed {
        /// Transport-reported cause, None for a normal closure.
        cause: Option<String>,
    },
}

/// Pull-based pagination over events missed while offline.
///
/// Implementations wrap the backend's notification endpoint; the engine
/// calls `fetch_page` repeatedly until a page reports `has_more = false`.
#[async_trait]
pub trait CatchUpSource: Send + Sync {
    /// Fetch one page of pending events after `cursor` (None = from the
    /// beginning of history).
    async fn fetch_page(
        &self,
        cursor: Option<&EventId>,
        page_size: usize,
        client_id: &ClientId,
    ) -> Result<EventPage, SourceError>;
}

/// A push channel delivering events in near-real-time.
///
/// The channel signals its own lifecycle: after `connect`, `recv` yields
/// `Opened` first, then payload frames, and finally `Closed`.
#[async_trait]
pub trait LiveSource: Send + Sync {
    /// Establish the push channel.
    async fn connect(&self) -> Result<(), SourceError>;

    /// Receive the next frame. Blocks until a frame arrives or the
    /// channel closes.
    async fn recv(&self) -> Result<LiveChannelEvent, SourceError>;

    /// Close the channel gracefully.
    async fn close(&self) -> Result<(), SourceError>;
}
