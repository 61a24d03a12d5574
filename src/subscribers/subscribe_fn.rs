//! # Function-backed subscriber (`SubscribeFn`)
//!
//! [`SubscribeFn`] wraps a closure `F: Fn(&Subscriber, &Payload)` so small
//! subscribers do not need a dedicated type.
//!
//! ## Example
//! ```rust
//! use subcast::{Broadcaster, Payload, SubscribeFn, Subscriber};
//!
//! let broadcaster = Broadcaster::default();
//! let sub = Subscriber::attach(
//!     &broadcaster,
//!     SubscribeFn::new("printer", |s: &Subscriber, p: &Payload| {
//!         println!("subscriber {} got {p}", s.id());
//!     }),
//! );
//!
//! broadcaster.publish("hi");
//! assert_eq!(sub.name(), "printer");
//! assert_eq!(sub.last_seen().as_deref(), Some("hi"));
//! ```

use std::fmt;

use crate::Payload;
use crate::subscribers::{Subscribe, Subscriber};

/// Function-backed subscriber implementation.
pub struct SubscribeFn<F> {
    name: &'static str,
    f: F,
}

impl<F> SubscribeFn<F>
where
    F: Fn(&Subscriber, &Payload) + Send + Sync + 'static,
{
    /// Creates a new function-backed subscriber.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Subscribe for SubscribeFn<F>
where
    F: Fn(&Subscriber, &Payload) + Send + Sync + 'static,
{
    fn on_update(&self, subscriber: &Subscriber, payload: &Payload) {
        (self.f)(subscriber, payload)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> fmt::Debug for SubscribeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeFn")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
