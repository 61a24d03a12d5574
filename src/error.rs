//! Error types reported by the delivery machinery.
//!
//! No public operation of the broadcaster returns `Result`: subscribing,
//! unsubscribing and publishing cannot fail. [`DeliveryError`] describes what
//! went wrong for a *single* subscriber during a notification pass and surfaces
//! through [`PublishReport`](crate::PublishReport), logs and bus events.
//!
//! Like the rest of the crate it provides helper methods (`as_label`,
//! `as_message`) for logging/metrics.

use thiserror::Error;

use crate::subscribers::SubscriberId;

/// # Per-subscriber delivery failures.
///
/// A failure never aborts the notification pass for other subscribers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Subscriber callback panicked while handling the payload.
    #[error("subscriber {name} ({subscriber}) panicked: {info}")]
    Panicked {
        /// Identity of the panicking subscriber.
        subscriber: SubscriberId,
        /// Subscriber name (see `Subscribe::name`).
        name: &'static str,
        /// Panic message, or `"unknown panic"` if it was not a string.
        info: String,
    },

    /// Queue of a queued subscriber is full; the payload was dropped for it.
    #[error("queue of subscriber {name} is full; payload dropped")]
    QueueFull {
        /// Subscriber name.
        name: &'static str,
    },

    /// Worker of a queued subscriber is gone; the payload was dropped for it.
    #[error("queue of subscriber {name} is closed; payload dropped")]
    QueueClosed {
        /// Subscriber name.
        name: &'static str,
    },
}

impl DeliveryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use subcast::DeliveryError;
    ///
    /// let err = DeliveryError::QueueFull { name: "audit" };
    /// assert_eq!(err.as_label(), "delivery_queue_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Panicked { .. } => "delivery_panicked",
            DeliveryError::QueueFull { .. } => "delivery_queue_full",
            DeliveryError::QueueClosed { .. } => "delivery_queue_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DeliveryError::Panicked { info, .. } => format!("panic: {info}"),
            DeliveryError::QueueFull { .. } => "queue full".to_string(),
            DeliveryError::QueueClosed { .. } => "queue closed".to_string(),
        }
    }

    /// Name of the subscriber the failure belongs to.
    pub fn subscriber_name(&self) -> &'static str {
        match self {
            DeliveryError::Panicked { name, .. }
            | DeliveryError::QueueFull { name }
            | DeliveryError::QueueClosed { name } => name,
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_info(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
