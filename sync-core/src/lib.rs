//! # sync-core
//!
//! Pure logic for msgsync (no I/O, instant tests).
//!
//! This crate implements the state machines and bookkeeping for incremental
//! sync without any network or disk I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce
//! output without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (page fetches, live channel reads, checkpoint writes) is
//! performed by `sync-engine`, which drives these state machines.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catchup;
pub mod dedup;
pub mod status;

pub use catchup::{CatchUpPhase, CatchUpProgress, PageOutcome, ProgressError};
pub use dedup::CatchUpBuffer;
pub use status::SyncStatus;
