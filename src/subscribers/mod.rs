//! # Subscribers: the receiving side of a broadcaster.
//!
//! This module provides the [`Subscribe`] trait implemented by the hosting
//! program, the [`Subscriber`] registration handle that binds an implementation
//! to one [`Broadcaster`](crate::Broadcaster), and a few ready-made helpers.
//!
//! ## Architecture
//! ```text
//! Payload flow:
//!   Broadcaster::publish(payload) ──► snapshot of registrations
//!                                         │ (registration order, still-attached only)
//!                                         ├──► Subscriber #1 ──► Subscribe::on_update
//!                                         ├──► Subscriber #2 ──► Subscribe::on_update ──► detach() (self-removal)
//!                                         └──► Subscriber #3 ──► Queued ──► [queue] ──► SubscribeAsync
//! ```
//!
//! ## Subscriber types
//! - **Inline subscribers** - any [`Subscribe`] impl, or a closure via [`SubscribeFn`]
//! - **Queued subscribers** - [`Queued`] forwards to an async [`SubscribeAsync`] worker
//! - **LogWriter** - prints every payload (`logging` feature, demo/debug)

mod queued;
mod subscribe;
mod subscribe_fn;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use queued::{QueueWorker, Queued, SubscribeAsync};
pub use subscribe::Subscribe;
pub use subscribe_fn::SubscribeFn;
pub use subscriber::{Subscriber, SubscriberId, SubscriberState};

#[cfg(feature = "logging")]
pub use log::LogWriter;
