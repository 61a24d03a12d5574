//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints every payload it receives to stdout.
//!
//! ## Output format
//! ```text
//! [update] subscriber=#1 payload="Hello World! :D"
//! [update] subscriber=#2 payload="Hello World! :D"
//! ```
//!
//! ## Example
//! ```no_run
//! # use subcast::{Broadcaster, LogWriter, Subscriber};
//! let broadcaster = Broadcaster::default();
//! let _sub = Subscriber::attach(&broadcaster, LogWriter::new());
//! broadcaster.publish("hello");
//! ```

use crate::Payload;
use crate::subscribers::{Subscribe, Subscriber};

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature.
/// Not intended for production use - implement a custom [`Subscribe`] for
/// real sinks.
#[derive(Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Formats one delivery line.
    pub fn render(subscriber: &Subscriber, payload: &Payload) -> String {
        format!("[update] subscriber={} payload={:?}", subscriber.id(), &**payload)
    }
}

impl Subscribe for LogWriter {
    fn on_update(&self, subscriber: &Subscriber, payload: &Payload) {
        println!("{}", Self::render(subscriber, payload));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
