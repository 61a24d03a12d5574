//! # subcast
//!
//! **subcast** is a small, synchronous, single-topic broadcaster.
//!
//! A [`Broadcaster`] holds an ordered sequence of [`Subscriber`] registrations
//! and the last published payload. [`Broadcaster::publish`] pushes the new
//! payload to every registered subscriber, inline, in registration order, and
//! stays consistent while subscribers attach or detach themselves (or each
//! other) *during* that pass.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Subscribe   │   │  SubscribeFn │   │    Queued    │
//!     │ (user impl)  │   │  (closure)   │   │ (async impl) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ Subscriber#1 │   │ Subscriber#2 │   │ Subscriber#3 │  (Arc, owned by host)
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ WeakBroadcaster  │                  │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Broadcaster                                                      │
//! │  - Mutex<State> { Registry (Weak<Subscriber> + attached flags),   │
//! │                   payload }                                       │
//! │  - Bus (diagnostic events)                                        │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                         Broadcaster::events()
//! ```
//!
//! ### Notification pass
//! ```text
//! publish(payload)
//!   ├─► lock: payload = new; snapshot registrations
//!   ├─► for each snapshot slot (registration order):
//!   │       ├─ detached since snapshot ─► skip
//!   │       ├─ subscriber dropped      ─► skip
//!   │       └─ on_update(payload)       (no lock held; may detach/subscribe/publish)
//!   │             └─ panic ─► caught (Config::isolate_panics) ─► SubscriberPanicked
//!   ├─► lock: prune dropped subscribers
//!   └─► Published event, PublishReport returned
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                       |
//! |-------------------|---------------------------------------------------------------|------------------------------------------|
//! | **Broadcasting**  | Subscribe, unsubscribe, publish, count.                       | [`Broadcaster`], [`PublishReport`]        |
//! | **Subscribers**   | Receive payloads, detach at any time (also from a callback).  | [`Subscribe`], [`Subscriber`], [`SubscribeFn`] |
//! | **Async bridge**  | Offload slow subscribers onto a queue + tokio worker.         | [`Queued`], [`SubscribeAsync`]            |
//! | **Diagnostics**   | Registration/delivery events over a broadcast bus.            | [`Event`], [`EventKind`], [`Bus`]         |
//! | **Errors**        | Per-subscriber delivery failures.                             | [`DeliveryError`]                         |
//! | **Configuration** | Bus capacity, panic isolation, initial payload.               | [`Config`]                                |
//! | **Global**        | Exactly-once process-wide instance.                           | [`global`], [`global_with`]               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use subcast::{Broadcaster, Payload, SubscribeFn, Subscriber};
//!
//! let broadcaster = Broadcaster::default();
//! let s1 = Subscriber::attach(&broadcaster, SubscribeFn::new("s1", |_: &Subscriber, _: &Payload| {}));
//! let s2 = Subscriber::attach(
//!     &broadcaster,
//!     SubscribeFn::new("s2", |me: &Subscriber, _: &Payload| me.detach()),
//! );
//! let s3 = Subscriber::attach(&broadcaster, SubscribeFn::new("s3", |_: &Subscriber, _: &Payload| {}));
//!
//! broadcaster.publish("X");
//! assert_eq!(broadcaster.count(), 2);
//!
//! broadcaster.publish("Y");
//! assert_eq!(s1.last_seen().as_deref(), Some("Y"));
//! assert_eq!(s2.last_seen().as_deref(), Some("X"));
//! assert_eq!(s3.last_seen().as_deref(), Some("Y"));
//! ```
mod core;
mod error;
mod events;
mod subscribers;

/// Published message. Opaque to the broadcaster; cheap to clone.
pub type Payload = std::sync::Arc<str>;

// ---- Public re-exports ----

pub use crate::core::{Broadcaster, Config, PublishReport, WeakBroadcaster, global, global_with};
pub use error::DeliveryError;
pub use events::{Bus, Event, EventKind};
pub use subscribers::{
    QueueWorker, Queued, Subscribe, SubscribeAsync, SubscribeFn, Subscriber, SubscriberId,
    SubscriberState,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
