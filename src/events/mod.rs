//! Diagnostic events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! observe what a [`Broadcaster`](crate::Broadcaster) does: registrations,
//! notification passes and per-subscriber delivery failures.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Broadcaster` (subscribe/unsubscribe/publish, caught panics),
//!   `Queued` subscribers and their workers (overflow/panic).
//! - **Consumers**: anything holding a receiver from `Broadcaster::events()`.
//!
//! Events are diagnostics only; payload delivery never goes through the bus.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
