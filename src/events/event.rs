//! # Diagnostic events emitted by the broadcaster and queued subscribers.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Registration/delivery events**: subscribe, unsubscribe, notification pass
//! - **Subscriber failure events**: caught panics and dropped payloads
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! subscriber identity, payload and counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use subcast::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Published)
//!     .with_payload("hello")
//!     .with_count(3)
//!     .with_delivered(3);
//!
//! assert_eq!(ev.kind, EventKind::Published);
//! assert_eq!(ev.payload.as_deref(), Some("hello"));
//! assert_eq!(ev.delivered, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::Payload;
use crate::subscribers::SubscriberId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration events ===
    /// A registration was appended to the sequence.
    ///
    /// Sets:
    /// - `subscriber`, `name`: the registered subscriber
    /// - `count`: registrations after the append
    Subscribed,

    /// A registration was removed from the sequence.
    ///
    /// Only emitted when something was actually removed; unsubscribing an
    /// absent subscriber is silent.
    ///
    /// Sets:
    /// - `subscriber`, `name`: the removed subscriber
    /// - `count`: registrations after the removal
    Unsubscribed,

    // === Delivery events ===
    /// A notification pass finished.
    ///
    /// Sets:
    /// - `payload`: the published payload
    /// - `delivered`: subscribers whose callback completed
    /// - `count`: live registrations after the pass
    Published,

    // === Subscriber failure events ===
    /// Subscriber panicked while handling a payload.
    ///
    /// Sets:
    /// - `subscriber`, `name`: the panicking subscriber (`subscriber` is unset
    ///   when the panic happened in a queue worker)
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Queued subscriber dropped a payload (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`, `name`: the subscriber that missed the payload
    /// - `payload`: the dropped payload
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,
}

/// Diagnostic event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Subscriber the event is about, if applicable.
    pub subscriber: Option<SubscriberId>,
    /// Subscriber name, if applicable.
    pub name: Option<Arc<str>>,
    /// Payload involved, if applicable.
    pub payload: Option<Payload>,
    /// Human-readable reason (panic info, overflow details).
    pub reason: Option<Arc<str>>,
    /// Registration count after the operation.
    pub count: Option<usize>,
    /// Successful deliveries in a notification pass.
    pub delivered: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            subscriber: None,
            name: None,
            payload: None,
            reason: None,
            count: None,
            delivered: None,
        }
    }

    /// Attaches subscriber identity and name.
    #[inline]
    pub fn with_subscriber(mut self, id: SubscriberId, name: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(id);
        self.name = Some(name.into());
        self
    }

    /// Attaches a subscriber name without an identity.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches a payload.
    #[inline]
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the registration count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches the number of successful deliveries.
    #[inline]
    pub fn with_delivered(mut self, delivered: usize) -> Self {
        self.delivered = Some(delivered);
        self
    }

    /// Helper: subscriber panicked while handling a payload.
    pub fn subscriber_panicked(name: &'static str, info: impl Into<Arc<str>>) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_name(name)
            .with_reason(info)
    }

    /// Helper: queued subscriber dropped a payload.
    pub fn subscriber_overflow(
        id: SubscriberId,
        name: &'static str,
        payload: Payload,
        reason: &'static str,
    ) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(id, name)
            .with_payload(payload)
            .with_reason(reason)
    }

    /// True if this is a subscriber failure event.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow
        )
    }
}
