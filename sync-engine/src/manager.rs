//! Remote sync orchestration.
//!
//! [`IncrementalSyncManager`] drives one [`EventStream`] to completion:
//! it pulls items sequentially, hands envelopes to the processor, persists
//! the checkpoint behind confirmed catch-up events and publishes status
//! transitions over a watch channel. The remote pipeline is fail-fast -
//! skipping a rejected event would leave a gap in ordered history, so any
//! error stops the run and surfaces as [`SyncStatus::Failed`]. Retry
//! policy belongs to the caller, which builds a fresh manager per attempt.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use msgsync_core::SyncStatus;
use msgsync_types::EventId;

use crate::checkpoint::CheckpointStore;
use crate::config::SyncConfig;
use crate::error::SyncFailure;
use crate::processor::EventProcessor;
use crate::sources::{CatchUpSource, LiveSource};
use crate::stream::{EventStream, StreamItem};

/// Drives one sync attempt from catch-up through live delivery.
pub struct IncrementalSyncManager<C, L, K, P> {
    stream: EventStream<C, L, K>,
    checkpoint: Arc<K>,
    processor: Arc<P>,
    status_tx: watch::Sender<SyncStatus>,
    cancel: CancellationToken,
}

impl<C, L, K, P> IncrementalSyncManager<C, L, K, P>
where
    C: CatchUpSource,
    L: LiveSource,
    K: CheckpointStore,
    P: EventProcessor,
{
    /// Create a manager over the given sources, store and processor.
    pub fn new(
        config: &SyncConfig,
        catch_up: C,
        live: L,
        checkpoint: Arc<K>,
        processor: Arc<P>,
    ) -> Self {
        let stream = EventStream::new(config, catch_up, live, Arc::clone(&checkpoint));
        let (status_tx, _) = watch::channel(SyncStatus::Pending);
        Self {
            stream,
            checkpoint,
            processor,
            status_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Observer handle for the sync status.
    pub fn status(&self) -> SyncStatusObserver {
        SyncStatusObserver {
            receiver: self.status_tx.subscribe(),
        }
    }

    /// Token that stops the run when cancelled.
    ///
    /// Cancellation is observed at item boundaries: the envelope being
    /// processed when the token fires is still completed.
    pub fn cancellation_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the pipeline until the stream ends, a failure occurs or the
    /// cancellation token fires. Cancellation is not a failure.
    pub async fn run(mut self) -> Result<(), SyncFailure> {
        self.publish(SyncStatus::CatchingUp);
        let result = self.drive().await;
        self.stream.close().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "sync pipeline failed");
            self.publish(SyncStatus::Failed {
                reason: e.to_string(),
            });
        }
        result
    }

    async fn drive(&mut self) -> Result<(), SyncFailure> {
        loop {
            let item = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!("sync cancelled");
                    return Ok(());
                }
                item = self.stream.next() => item?,
            };

            let Some(item) = item else {
                return Ok(());
            };

            match item {
                StreamItem::CaughtUp { last_event_id } => {
                    self.publish(SyncStatus::Live { last_event_id });
                }
                StreamItem::Envelope(envelope) => {
                    self.processor.process(&envelope).await?;
                    // Only confirmed catch-up progress is durable; live
                    // events are covered by the next catch-up and
                    // transient events by nothing at all.
                    if envelope.is_catch_up() && !envelope.delivery.is_transient {
                        self.checkpoint.write(&envelope.event.id).await?;
                    }
                }
            }
        }
    }

    fn publish(&self, status: SyncStatus) {
        tracing::debug!(status = %status, "sync status");
        self.status_tx.send_replace(status);
    }
}

/// Read side of the sync status watch channel.
#[derive(Clone)]
pub struct SyncStatusObserver {
    receiver: watch::Receiver<SyncStatus>,
}

impl SyncStatusObserver {
    /// The most recently published status.
    pub fn current(&self) -> SyncStatus {
        self.receiver.borrow().clone()
    }

    /// Wait for the next status change. Returns None once the manager has
    /// been dropped.
    pub async fn changed(&mut self) -> Option<SyncStatus> {
        match self.receiver.changed().await {
            Ok(()) => Some(self.receiver.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// Wait until the pipeline is live or has failed.
    ///
    /// Returns the terminal-ish status reached, or None if the manager was
    /// dropped before reaching either. The id inside `Live` is the newest
    /// event delivered during catch-up.
    pub async fn wait_until_live(&mut self) -> Option<SyncStatus> {
        loop {
            let status = self.receiver.borrow_and_update().clone();
            match status {
                SyncStatus::Live { .. } | SyncStatus::Failed { .. } => return Some(status),
                SyncStatus::Pending | SyncStatus::CatchingUp => {}
            }
            if self.receiver.changed().await.is_err() {
                return None;
            }
        }
    }
}

/// Convenience for callers that only need the id out of a `Live` status.
pub fn live_event_id(status: &SyncStatus) -> Option<&EventId> {
    match status {
        SyncStatus::Live {
            last_event_id: Some(id),
        } => Some(id),
        _ => None,
    }
}
