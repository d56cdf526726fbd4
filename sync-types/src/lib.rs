//! # sync-types
//!
//! Event and envelope types for the msgsync incremental sync core.
//!
//! This crate provides the foundational types used across all msgsync crates:
//! - [`EventId`], [`ClientId`] - Identity and ordering types
//! - [`Event`], [`EventPage`] - The domain event model
//! - [`EventEnvelope`], [`DeliveryInfo`], [`EventSource`] - Delivery metadata
//! - [`ProcessingFailure`] - Processor rejection error

#![warn(missing_docs)]
#![warn(clippy::all)]

mod envelope;
mod error;
mod event;
mod ids;

pub use envelope::{DeliveryInfo, EventEnvelope, EventSource};
pub use error::ProcessingFailure;
pub use event::{Event, EventPage};
pub use ids::{ClientId, EventId};
