//! The remote event stream: catch-up pagination + live push behind one
//! ordered sequence.
//!
//! The stream is pull-based: the single consumer calls [`EventStream::next`]
//! and gets either an envelope or the one-time caught-up marker. Page
//! fetches and live forwarding are strictly sequential inside `next`, which
//! is what preserves source order - there is no fan-in of concurrent
//! fetchers. Because delivery is synchronous with consumption, the
//! pagination cursor only ever advances past pages the consumer has fully
//! taken delivery of.

use std::collections::VecDeque;
use std::sync::Arc;

use msgsync_core::{CatchUpBuffer, CatchUpPhase, CatchUpProgress, PageOutcome, ProgressError};
use msgsync_types::{ClientId, Event, EventEnvelope, EventId};

use crate::checkpoint::CheckpointStore;
use crate::config::SyncConfig;
use crate::error::SyncFailure;
use crate::sources::{CatchUpSource, LiveChannelEvent, LiveSource, SourceError};

/// One item produced by the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    /// Catch-up finished; live delivery follows. Emitted exactly once.
    CaughtUp {
        /// Newest event id fetched during catch-up, None if there were
        /// no pending events.
        last_event_id: Option<EventId>,
    },
    /// An inbound remote event.
    Envelope(EventEnvelope),
}

/// Metadata of a fetched page whose events are being handed out.
#[derive(Debug)]
struct PageMeta {
    last_id: Option<EventId>,
    count: usize,
    has_more: bool,
}

/// One ordered sequence of remote events, transparently switching from
/// pull-based catch-up to push-based live delivery.
///
/// One instance is one sync attempt: the checkpoint is read freshly when
/// the live channel opens and the stream never retries on its own. The
/// owner decides whether to build a new stream after a failure.
pub struct EventStream<C, L, K> {
    catch_up: C,
    live: L,
    checkpoint: Arc<K>,
    client_id: ClientId,
    page_size: usize,
    progress: CatchUpProgress,
    buffer: CatchUpBuffer,
    pending: VecDeque<Event>,
    page_meta: Option<PageMeta>,
}

impl<C, L, K> EventStream<C, L, K>
where
    C: CatchUpSource,
    L: LiveSource,
    K: CheckpointStore,
{
    /// Create a stream over the given sources.
    pub fn new(config: &SyncConfig, catch_up: C, live: L, checkpoint: Arc<K>) -> Self {
        Self {
            catch_up,
            live,
            checkpoint,
            client_id: config.client_id,
            page_size: config.page_size,
            progress: CatchUpProgress::new(),
            buffer: CatchUpBuffer::new(),
            pending: VecDeque::new(),
            page_meta: None,
        }
    }

    /// Current phase of the stream.
    pub fn phase(&self) -> CatchUpPhase {
        self.progress.phase()
    }

    /// Produce the next item.
    ///
    /// Returns `Ok(None)` once the stream has ended; any error is terminal
    /// for this stream and tears the live channel down. The first call
    /// connects the live channel and starts catch-up.
    pub async fn next(&mut self) -> Result<Option<StreamItem>, SyncFailure> {
        let result = self.advance().await;
        if result.is_err() {
            self.close_channel().await;
        }
        result
    }

    /// Tear the stream down: mark it closed and release the live channel.
    ///
    /// Idempotent. Owners call this on every exit path the stream cannot
    /// see itself (cancellation, consumer shutdown).
    pub async fn close(&mut self) {
        self.progress.closed();
        self.close_channel().await;
    }

    async fn close_channel(&mut self) {
        if let Err(e) = self.live.close().await {
            tracing::warn!(error = %e, "live channel close failed");
        }
    }

    async fn advance(&mut self) -> Result<Option<StreamItem>, SyncFailure> {
        loop {
            match self.progress.phase() {
                CatchUpPhase::Initial => self.open().await?,
                CatchUpPhase::CatchingUp => {
                    if let Some(event) = self.pending.pop_front() {
                        self.buffer.add(event.id.clone());
                        return Ok(Some(StreamItem::Envelope(EventEnvelope::catch_up(event))));
                    }
                    match self.page_meta.take() {
                        Some(meta) => {
                            if let Some(item) = self.accept_page(meta)? {
                                return Ok(Some(item));
                            }
                        }
                        None => self.fetch_page().await?,
                    }
                }
                CatchUpPhase::Live => {
                    if let Some(item) = self.next_live().await? {
                        return Ok(Some(item));
                    }
                }
                CatchUpPhase::Closed => return Ok(None),
            }
        }
    }

    /// Connect the live channel, wait for its open signal and read the
    /// checkpoint to resume from.
    async fn open(&mut self) -> Result<(), SyncFailure> {
        if let Err(e) = self.live.connect().await {
            self.progress.closed();
            return Err(e.into());
        }

        loop {
            match self.live.recv().await {
                Ok(LiveChannelEvent::Opened) => break,
                Ok(LiveChannelEvent::NonBinaryPayload) => {
                    tracing::warn!("non-binary payload before channel open");
                }
                Ok(LiveChannelEvent::Payload(event)) => {
                    tracing::warn!(event_id = %event.id, "payload before channel open, dropping");
                }
                Ok(LiveChannelEvent::Closed { cause }) => {
                    self.progress.closed();
                    return Err(SourceError::ChannelClosed { cause }.into());
                }
                Err(e) => {
                    self.progress.closed();
                    return Err(e.into());
                }
            }
        }

        // Fresh read per attempt: another component may have reset sync
        // state since the last attempt.
        let checkpoint = match self.checkpoint.read().await {
            Ok(checkpoint) => checkpoint,
            Err(e) => {
                self.progress.closed();
                return Err(e.into());
            }
        };

        tracing::info!(checkpoint = ?checkpoint, "live channel open, catching up");
        self.buffer.clear();
        self.progress
            .channel_opened(checkpoint)
            .map_err(|e| SyncFailure::Internal(e.to_string()))
    }

    /// Fetch the next catch-up page and stage its events for delivery.
    async fn fetch_page(&mut self) -> Result<(), SyncFailure> {
        let cursor = self.progress.cursor().cloned();
        tracing::debug!(cursor = ?cursor, page_size = self.page_size, "fetching catch-up page");

        let page = match self
            .catch_up
            .fetch_page(cursor.as_ref(), self.page_size, &self.client_id)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                self.progress.closed();
                return Err(e.into());
            }
        };

        self.page_meta = Some(PageMeta {
            last_id: page.last_event_id().cloned(),
            count: page.events.len(),
            has_more: page.has_more,
        });
        self.pending = page.events.into();
        Ok(())
    }

    /// Advance the cursor past a fully delivered page.
    fn accept_page(&mut self, meta: PageMeta) -> Result<Option<StreamItem>, SyncFailure> {
        match self
            .progress
            .page_accepted(meta.last_id.as_ref(), meta.count, meta.has_more)
        {
            Ok(PageOutcome::Continue { .. }) => Ok(None),
            Ok(PageOutcome::CaughtUp { last_event_id }) => {
                tracing::info!(last_event_id = ?last_event_id, "catch-up finished, forwarding live events");
                Ok(Some(StreamItem::CaughtUp { last_event_id }))
            }
            Err(ProgressError::EmptyPageWithMore) => {
                self.progress.closed();
                Err(SyncFailure::MalformedPage {
                    detail: "has_more flagged on a page with zero events".to_string(),
                })
            }
            Err(e) => {
                self.progress.closed();
                Err(SyncFailure::Internal(e.to_string()))
            }
        }
    }

    /// Receive one live frame; `Ok(None)` means the frame was absorbed
    /// (duplicate, non-binary) and the caller should receive again.
    async fn next_live(&mut self) -> Result<Option<StreamItem>, SyncFailure> {
        match self.live.recv().await {
            Ok(LiveChannelEvent::Payload(event)) => {
                if self.buffer.contains(&event.id) {
                    if self.buffer.clear_if_newest(&event.id) {
                        tracing::debug!(event_id = %event.id, "live channel caught up with catch-up tail");
                    } else {
                        self.buffer.remove(&event.id);
                        tracing::debug!(event_id = %event.id, "skipping live replay of catch-up event");
                    }
                    Ok(None)
                } else {
                    Ok(Some(StreamItem::Envelope(EventEnvelope::live(event))))
                }
            }
            Ok(LiveChannelEvent::NonBinaryPayload) => {
                tracing::warn!("non-binary payload on live channel");
                Ok(None)
            }
            Ok(LiveChannelEvent::Opened) => {
                tracing::warn!("unexpected open signal on live channel");
                Ok(None)
            }
            Ok(LiveChannelEvent::Closed { cause }) => {
                self.progress.closed();
                Err(SourceError::ChannelClosed { cause }.into())
            }
            Err(e) => {
                self.progress.closed();
                Err(e.into())
            }
        }
    }
}
