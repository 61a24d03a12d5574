//! Broadcaster core: registration, notification passes and configuration.
//!
//! The public API from this module is [`Broadcaster`] (with its weak handle and
//! pass report), [`Config`] and the process-wide instance accessors.
//!
//! Internal modules:
//! - [`broadcaster`]: payload state, subscribe/unsubscribe/publish, panic isolation;
//! - [`registry`]: ordered registration sequence with snapshot-and-flag traversal;
//! - [`global`]: exactly-once process-wide broadcaster;
//! - [`config`]: broadcaster settings.

mod broadcaster;
mod config;
mod global;
mod registry;

pub use broadcaster::{Broadcaster, PublishReport, WeakBroadcaster};
pub use config::Config;
pub use global::{global, global_with};
