//! # Core subscriber trait
//!
//! `Subscribe` is the extension point the hosting program implements to receive
//! payloads. The core never constructs subscriber business logic itself; it only
//! calls [`Subscribe::on_update`] through the owning
//! [`Subscriber`](crate::Subscriber).
//!
//! ## Contract
//! - Called **synchronously** from `Broadcaster::publish`, on the publishing
//!   thread, in registration order.
//! - No lock is held during the call: implementations may call back into the
//!   broadcaster (`detach`, `subscribe`, even `publish`).
//! - Slow implementations delay the publisher and every subscriber after them.
//!   Wrap async or heavy work in [`Queued`](crate::Queued).
//!
//! ## Example
//! ```rust
//! use subcast::{Broadcaster, Payload, Subscribe, Subscriber};
//!
//! struct OneShot;
//!
//! impl Subscribe for OneShot {
//!     fn on_update(&self, subscriber: &Subscriber, payload: &Payload) {
//!         println!("got {payload}, leaving");
//!         subscriber.detach();
//!     }
//!     fn name(&self) -> &'static str { "one-shot" }
//! }
//!
//! let broadcaster = Broadcaster::default();
//! let sub = Subscriber::attach(&broadcaster, OneShot);
//! broadcaster.publish("hello");
//! assert!(!sub.is_attached());
//! ```

use crate::Payload;
use crate::subscribers::Subscriber;

/// Contract for payload receivers.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle one published payload.
    ///
    /// # Parameters
    /// - `subscriber`: the registration handle this callback belongs to; call
    ///   [`Subscriber::detach`] on it for self-removal
    /// - `payload`: the published payload (already stored as the subscriber's
    ///   last seen payload)
    fn on_update(&self, subscriber: &Subscriber, payload: &Payload);

    /// Human-readable name (for logs/events).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
