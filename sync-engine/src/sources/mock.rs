//! Mock sources for testing.
//!
//! Allow queueing pages and live frames, forcing failures, and capturing
//! the requests the engine makes.

use super::{CatchUpSource, LiveChannelEvent, LiveSource, SourceError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use msgsync_types::{ClientId, Event, EventId, EventPage};

/// Mock catch-up source.
///
/// Pages are served in the order they were queued; an exhausted queue
/// serves empty terminal pages. Requested cursors are recorded for
/// verification.
#[derive(Debug, Default)]
pub struct MockCatchUpSource {
    inner: Arc<Mutex<MockCatchUpInner>>,
}

#[derive(Debug, Default)]
struct MockCatchUpInner {
    pages: VecDeque<EventPage>,
    requested_cursors: Vec<Option<EventId>>,
    requested_page_sizes: Vec<usize>,
    fail_next_fetch: Option<String>,
}

impl MockCatchUpSource {
    /// Create a new mock catch-up source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page to be returned by the next `fetch_page` call.
    pub fn queue_page(&self, page: EventPage) {
        let mut inner = self.inner.lock().unwrap();
        inner.pages.push_back(page);
    }

    /// Cursors of all page requests made so far, in order.
    pub fn requested_cursors(&self) -> Vec<Option<EventId>> {
        let inner = self.inner.lock().unwrap();
        inner.requested_cursors.clone()
    }

    /// Page sizes of all page requests made so far, in order.
    pub fn requested_page_sizes(&self) -> Vec<usize> {
        let inner = self.inner.lock().unwrap();
        inner.requested_page_sizes.clone()
    }

    /// Number of page requests made so far.
    pub fn fetch_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.requested_cursors.len()
    }

    /// Cause the next `fetch_page` to fail with the given error.
    pub fn fail_next_fetch(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_fetch = Some(error.to_string());
    }
}

impl Clone for MockCatchUpSource {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl CatchUpSource for MockCatchUpSource {
    async fn fetch_page(
        &self,
        cursor: Option<&EventId>,
        page_size: usize,
        _client_id: &ClientId,
    ) -> Result<EventPage, SourceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requested_cursors.push(cursor.cloned());
        inner.requested_page_sizes.push(page_size);

        if let Some(error) = inner.fail_next_fetch.take() {
            return Err(SourceError::RequestFailed(error));
        }

        Ok(inner.pages.pop_front().unwrap_or_else(EventPage::empty))
    }
}

/// Mock live source.
///
/// Frames are pushed by the test and received by the engine in order.
/// `recv` blocks while the frame queue is empty, like a real push channel.
#[derive(Debug)]
pub struct MockLiveSource {
    state: Arc<Mutex<MockLiveState>>,
    tx: tokio::sync::mpsc::UnboundedSender<LiveChannelEvent>,
    rx: Arc<tokio::sync::Mutex<tokio::sync::mpsc::UnboundedReceiver<LiveChannelEvent>>>,
}

#[derive(Debug, Default)]
struct MockLiveState {
    connected: bool,
    connect_count: usize,
    fail_next_connect: Option<String>,
    fail_next_recv: Option<String>,
}

impl MockLiveSource {
    /// Create a new mock live source.
    pub fn new() -> Self {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        Self {
            state: Arc::new(Mutex::new(MockLiveState::default())),
            tx,
            rx: Arc::new(tokio::sync::Mutex::new(rx)),
        }
    }

    /// Push an `Opened` frame.
    pub fn push_opened(&self) {
        let _ = self.tx.send(LiveChannelEvent::Opened);
    }

    /// Push an event payload frame.
    pub fn push_event(&self, event: Event) {
        let _ = self.tx.send(LiveChannelEvent::Payload(event));
    }

    /// Push a non-binary payload frame.
    pub fn push_non_binary(&self) {
        let _ = self.tx.send(LiveChannelEvent::NonBinaryPayload);
    }

    /// Push a `Closed` frame.
    pub fn push_closed(&self, cause: Option<&str>) {
        let _ = self.tx.send(LiveChannelEvent::Closed {
            cause: cause.map(str::to_string),
        });
    }

    /// Number of `connect` calls made so far.
    pub fn connect_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.connect_count
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.connected
    }

    /// Cause the next `connect` to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        let mut state = self.state.lock().unwrap();
        state.fail_next_connect = Some(error.to_string());
    }

    /// Cause the next `recv` to fail with the given error.
    pub fn fail_next_recv(&self, error: &str) {
        let mut state = self.state.lock().unwrap();
        state.fail_next_recv = Some(error.to_string());
    }
}

impl Default for MockLiveSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockLiveSource {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            tx: self.tx.clone(),
            rx: Arc::clone(&self.rx),
        }
    }
}

#[async_trait]
impl LiveSource for MockLiveSource {
    async fn connect(&self) -> Result<(), SourceError> {
        let mut state = self.state.lock().unwrap();
        state.connect_count += 1;

        if let Some(error) = state.fail_next_connect.take() {
            return Err(SourceError::ConnectionFailed(error));
        }

        state.connected = true;
        Ok(())
    }

    async fn recv(&self) -> Result<LiveChannelEvent, SourceError> {
        {
            let mut state = self.state.lock().unwrap();
            if !state.connected {
                return Err(SourceError::NotConnected);
            }
            if let Some(error) = state.fail_next_recv.take() {
                return Err(SourceError::RequestFailed(error));
            }
        }

        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or(SourceError::ChannelClosed {
            cause: Some("mock frame sender dropped".to_string()),
        })
    }

    async fn close(&self) -> Result<(), SourceError> {
        let mut state = self.state.lock().unwrap();
        state.connected = false;
        Ok(())
    }
}
