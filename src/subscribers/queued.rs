//! # Queued: hand payloads to an async subscriber without blocking `publish`
//!
//! [`Queued`] is a synchronous [`Subscribe`] that forwards each payload into a
//! bounded queue drained by a dedicated worker task running a
//! [`SubscribeAsync`] implementation.
//!
//! ## Architecture
//! ```text
//! publish(payload)
//!     │   (sync pass, registration order)
//!     ├──► Subscriber A ──► on_update()                      (inline)
//!     ├──► Subscriber Q ──► Queued::on_update ──try_send──► [queue] ──► worker ──► on_update().await
//!     │                                            │ full/closed        └──► panic → SubscriberPanicked
//!     │                                            └──► SubscriberOverflow (payload dropped)
//!     └──► Subscriber C ──► on_update()                      (inline)
//! ```
//!
//! ## Rules
//! - **Non-blocking**: `Queued::on_update` returns immediately (uses `try_send`)
//! - **FIFO**: the worker sees payloads in publish order
//! - **Overflow**: payload dropped for this subscriber only, `SubscriberOverflow` published
//! - **Isolation**: a panicking worker call is caught, reported, and the worker continues
//! - **Shutdown**: the worker exits once the owning [`Subscriber`] is dropped
//!   (queue sender closed) and the queue is drained
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use subcast::{Broadcaster, Payload, Queued, SubscribeAsync, Subscriber};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl SubscribeAsync for Audit {
//!     async fn on_update(&self, payload: &Payload) {
//!         // write audit record...
//!         let _ = payload;
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let broadcaster = Broadcaster::default();
//! let (queued, worker) = Queued::spawn(&broadcaster, Arc::new(Audit));
//! let sub = Subscriber::attach(&broadcaster, queued);
//!
//! broadcaster.publish("hello");
//!
//! drop(sub);
//! worker.join().await;
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::Payload;
use crate::core::Broadcaster;
use crate::error::{DeliveryError, panic_info};
use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, Subscriber};

/// Contract for subscribers whose work is asynchronous.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime.
#[async_trait]
pub trait SubscribeAsync: Send + Sync + 'static {
    /// Handle a single payload.
    async fn on_update(&self, payload: &Payload);

    /// Human-readable name (for logs/events).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    ///
    /// On overflow, payloads for this subscriber are **dropped** (warn).
    fn queue_capacity(&self) -> usize {
        1024
    }
}

/// Synchronous front of a queued async subscriber.
pub struct Queued {
    name: &'static str,
    sender: mpsc::Sender<Payload>,
    bus: Bus,
}

/// Worker draining a [`Queued`] subscriber's queue.
pub struct QueueWorker {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl Queued {
    /// Creates the queue and spawns its worker on the current tokio runtime.
    ///
    /// The queue holds `max(queue_capacity, 1)` payloads. Failures are reported
    /// on `broadcaster`'s event bus.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime (`tokio::spawn`).
    #[must_use]
    pub fn spawn(broadcaster: &Broadcaster, sub: Arc<dyn SubscribeAsync>) -> (Self, QueueWorker) {
        let cap = sub.queue_capacity().max(1);
        let name = sub.name();
        let (tx, mut rx) = mpsc::channel::<Payload>(cap);
        let bus = broadcaster.bus().clone();
        let bus_for_worker = bus.clone();

        let handle = tokio::spawn(async move {
            while let Some(payload) = rx.recv().await {
                let fut = sub.on_update(&payload);
                if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    let info = panic_info(&*panic_err);
                    warn!(subscriber = name, info = %info, "queued subscriber panicked");
                    bus_for_worker.publish(Event::subscriber_panicked(name, info));
                }
            }
            debug!(subscriber = name, "queue worker finished");
        });

        (
            Self {
                name,
                sender: tx,
                bus,
            },
            QueueWorker { name, handle },
        )
    }
}

impl Subscribe for Queued {
    /// Enqueues the payload; drops it for this subscriber if the queue is
    /// **full** or **closed** and publishes `SubscriberOverflow`.
    fn on_update(&self, subscriber: &Subscriber, payload: &Payload) {
        let (err, reason) = match self.sender.try_send(payload.clone()) {
            Ok(()) => return,
            Err(mpsc::error::TrySendError::Full(_)) => {
                (DeliveryError::QueueFull { name: self.name }, "full")
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                (DeliveryError::QueueClosed { name: self.name }, "closed")
            }
        };
        warn!(
            subscriber = %subscriber.id(),
            label = err.as_label(),
            "{err}"
        );
        self.bus.publish(Event::subscriber_overflow(
            subscriber.id(),
            self.name,
            payload.clone(),
            reason,
        ));
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl QueueWorker {
    /// Name of the subscriber this worker drives.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True once the worker loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker to drain its queue and exit.
    ///
    /// Only returns after every sender is gone, i.e. after the [`Subscriber`]
    /// wrapping the matching [`Queued`] has been dropped.
    pub async fn join(self) {
        let _ = self.handle.await;
    }

    /// Stops the worker immediately, discarding queued payloads.
    pub fn abort(&self) {
        self.handle.abort();
    }
}
