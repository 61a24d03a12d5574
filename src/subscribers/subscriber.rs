//! # Subscriber handle bound to one broadcaster.
//!
//! A [`Subscriber`] pairs a host-supplied [`Subscribe`] implementation with:
//! - a process-unique [`SubscriberId`], assigned in construction order;
//! - the last payload it received;
//! - a **non-owning** handle to the broadcaster it was attached to.
//!
//! ## Ownership
//! ```text
//!   host ──Arc──► Subscriber ──WeakBroadcaster──► Broadcaster
//!                     ▲                              │
//!                     └───────── Weak<Subscriber> ───┘
//! ```
//! Neither side owns the other. Dropping the last `Arc<Subscriber>` leaves an
//! inert registration that the broadcaster skips and prunes; dropping the
//! broadcaster turns `detach` into a no-op.
//!
//! ## State
//! `Attached → Detached`. A detached subscriber can only be registered again by
//! an explicit `Broadcaster::subscribe` call.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::Payload;
use crate::core::{Broadcaster, WeakBroadcaster};
use crate::subscribers::Subscribe;

/// Global sequence counter for subscriber identities.
static SUBSCRIBER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Process-unique, creation-ordered subscriber identity.
///
/// Ids start at 1 and increase with every constructed [`Subscriber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    fn next() -> Self {
        Self(SUBSCRIBER_SEQ.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Raw sequence number.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a [`Subscriber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// At least one registration for this subscriber is live.
    Attached,
    /// No live registration (detached, or the broadcaster is gone).
    Detached,
}

/// Registration handle: identity, last seen payload and bound broadcaster.
pub struct Subscriber {
    id: SubscriberId,
    broadcaster: WeakBroadcaster,
    handler: Box<dyn Subscribe>,
    last_seen: Mutex<Option<Payload>>,
}

impl Subscriber {
    /// Creates a subscriber bound to `broadcaster` and subscribes it immediately.
    ///
    /// The returned `Arc` is the only strong reference; the broadcaster keeps a
    /// weak one. Keep the `Arc` alive for as long as updates should arrive.
    pub fn attach(broadcaster: &Broadcaster, handler: impl Subscribe) -> Arc<Self> {
        let subscriber = Arc::new(Self {
            id: SubscriberId::next(),
            broadcaster: broadcaster.downgrade(),
            handler: Box::new(handler),
            last_seen: Mutex::new(None),
        });
        broadcaster.subscribe(&subscriber);
        subscriber
    }

    /// Identity assigned at construction.
    #[inline]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Name of the wrapped handler.
    pub fn name(&self) -> &'static str {
        self.handler.name()
    }

    /// Most recent payload delivered to this subscriber.
    pub fn last_seen(&self) -> Option<Payload> {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The bound broadcaster, if it still exists.
    pub fn broadcaster(&self) -> Option<Broadcaster> {
        self.broadcaster.upgrade()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SubscriberState {
        match self.broadcaster.upgrade() {
            Some(b) if b.contains(self.id) => SubscriberState::Attached,
            _ => SubscriberState::Detached,
        }
    }

    /// Shorthand for `state() == SubscriberState::Attached`.
    pub fn is_attached(&self) -> bool {
        self.state() == SubscriberState::Attached
    }

    /// Removes this subscriber's first registration from the bound broadcaster.
    ///
    /// Safe at any time, including from inside this subscriber's own
    /// `on_update`. No-op when not registered or when the broadcaster is gone.
    pub fn detach(&self) {
        if let Some(broadcaster) = self.broadcaster.upgrade() {
            broadcaster.unsubscribe(self);
        }
    }

    /// Records the payload, then hands it to the handler.
    pub(crate) fn on_update(&self, payload: &Payload) {
        *self
            .last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(payload.clone());
        self.handler.on_update(self, payload);
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("last_seen", &self.last_seen())
            .finish_non_exhaustive()
    }
}
