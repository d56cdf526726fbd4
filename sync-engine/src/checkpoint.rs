//! Checkpoint persistence - how far processing has durably progressed.
//!
//! The checkpoint is the id of the last event whose processing was
//! confirmed. It is read once per catch-up attempt (never cached across
//! attempts, so external resets are picked up) and written after every
//! successfully processed catch-up event. It must never advance past an
//! unconfirmed event; the strictly sequential consumer loop guarantees at
//! most one outstanding write.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use msgsync_types::EventId;

/// Checkpoint store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading the checkpoint failed.
    #[error("checkpoint read failed: {0}")]
    ReadFailed(String),

    /// Writing the checkpoint failed.
    #[error("checkpoint write failed: {0}")]
    WriteFailed(String),
}

/// Durable storage for the sync checkpoint.
///
/// Implementations wrap the metadata store of the surrounding app; writes
/// are assumed to be serialized by the store itself.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Read the current checkpoint (None = never synced).
    async fn read(&self) -> Result<Option<EventId>, StorageError>;

    /// Replace the checkpoint.
    async fn write(&self, id: &EventId) -> Result<(), StorageError>;
}

/// In-memory checkpoint store for tests and composition roots that do not
/// persist across restarts.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    inner: Arc<Mutex<InMemoryInner>>,
}

#[derive(Debug, Default)]
struct InMemoryInner {
    checkpoint: Option<EventId>,
    write_count: usize,
    fail_next_read: Option<String>,
    fail_next_write: Option<String>,
}

impl InMemoryCheckpointStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a checkpoint.
    pub fn with_checkpoint(id: EventId) -> Self {
        let store = Self::new();
        store.set(Some(id));
        store
    }

    /// Replace the stored checkpoint directly (test setup).
    pub fn set(&self, id: Option<EventId>) {
        let mut inner = self.inner.lock().unwrap();
        inner.checkpoint = id;
    }

    /// Current checkpoint without going through the trait.
    pub fn current(&self) -> Option<EventId> {
        let inner = self.inner.lock().unwrap();
        inner.checkpoint.clone()
    }

    /// Number of writes performed so far.
    pub fn write_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.write_count
    }

    /// Cause the next `read` to fail with the given error.
    pub fn fail_next_read(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_read = Some(error.to_string());
    }

    /// Cause the next `write` to fail with the given error.
    pub fn fail_next_write(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_write = Some(error.to_string());
    }
}

impl Clone for InMemoryCheckpointStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn read(&self) -> Result<Option<EventId>, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_read.take() {
            return Err(StorageError::ReadFailed(error));
        }
        Ok(inner.checkpoint.clone())
    }

    async fn write(&self, id: &EventId) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_write.take() {
            return Err(StorageError::WriteFailed(error));
        }
        inner.checkpoint = Some(id.clone());
        inner.write_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_empty() {
        let store = InMemoryCheckpointStore::new();
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_then_read() {
        let store = InMemoryCheckpointStore::new();
        store.write(&EventId::new("e5")).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(EventId::new("e5")));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn seeded_store_reads_back() {
        let store = InMemoryCheckpointStore::with_checkpoint(EventId::new("e9"));
        assert_eq!(store.read().await.unwrap(), Some(EventId::new("e9")));
    }

    #[tokio::test]
    async fn external_reset_is_visible() {
        // Another component may reset sync state between attempts.
        let store = InMemoryCheckpointStore::with_checkpoint(EventId::new("e9"));
        store.set(None);
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn forced_read_failure() {
        let store = InMemoryCheckpointStore::new();
        store.fail_next_read("disk gone");
        assert!(matches!(
            store.read().await,
            Err(StorageError::ReadFailed(_))
        ));
        assert!(store.read().await.is_ok());
    }

    #[tokio::test]
    async fn forced_write_failure_leaves_checkpoint_untouched() {
        let store = InMemoryCheckpointStore::with_checkpoint(EventId::new("e1"));
        store.fail_next_write("disk full");
        assert!(store.write(&EventId::new("e2")).await.is_err());
        assert_eq!(store.current(), Some(EventId::new("e1")));
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = InMemoryCheckpointStore::new();
        let reader = store.clone();
        store.write(&EventId::new("e3")).await.unwrap();
        assert_eq!(reader.current(), Some(EventId::new("e3")));
    }
}
