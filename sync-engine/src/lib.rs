//! msgsync-engine - the async half of msgsync: sources, stream, consumer
//! loops and orchestration.
//!
//! The pure state machines live in `msgsync-core`; this crate wires them
//! to tokio. The shape of the pipeline:
//!
//! ```text
//! CatchUpSource ──┐
//!                 ├─> EventStream ─> IncrementalSyncManager ─> EventProcessor
//! LiveSource ─────┘                        │                       └─> CheckpointStore
//!                                          └─> SyncStatus (watch)
//!
//! LocalEventBus ─> LocalEventManager ─> EventProcessor
//! ```
//!
//! The remote pipeline is fail-fast (ordered history must not have gaps);
//! the local pipeline logs and continues (local events are best-effort).
//! Both loops are strictly sequential, which is the entire concurrency
//! story: ordering, at-most-one-outstanding-checkpoint-write and
//! back-pressure all fall out of it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use msgsync_engine::{
//!     IncrementalSyncManager, InMemoryCheckpointStore, MockCatchUpSource,
//!     MockLiveSource, RecordingProcessor, SyncConfig,
//! };
//! use msgsync_types::ClientId;
//!
//! # async fn example() {
//! let config = SyncConfig::new(ClientId::new());
//! let manager = IncrementalSyncManager::new(
//!     &config,
//!     MockCatchUpSource::new(),
//!     MockLiveSource::new(),
//!     Arc::new(InMemoryCheckpointStore::new()),
//!     Arc::new(RecordingProcessor::new()),
//! );
//! let mut status = manager.status();
//! tokio::spawn(manager.run());
//! status.wait_until_live().await;
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod local_bus;
pub mod local_manager;
pub mod manager;
pub mod processor;
pub mod sources;
pub mod stream;

pub use checkpoint::{CheckpointStore, InMemoryCheckpointStore, StorageError};
pub use config::{SyncConfig, DEFAULT_LOCAL_BUS_CAPACITY, DEFAULT_PAGE_SIZE};
pub use error::SyncFailure;
pub use local_bus::{LocalEventBus, LocalEventSubscription};
pub use local_manager::LocalEventManager;
pub use manager::{IncrementalSyncManager, SyncStatusObserver};
pub use processor::{EventProcessor, RecordingProcessor};
pub use sources::{
    CatchUpSource, LiveChannelEvent, LiveSource, MockCatchUpSource, MockLiveSource, SourceError,
};
pub use stream::{EventStream, StreamItem};
