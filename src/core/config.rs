//! # Broadcaster configuration.
//!
//! Provides [`Config`], the settings a [`Broadcaster`](crate::Broadcaster) is
//! created with.
//!
//! Config is used in two ways:
//! 1. **Broadcaster creation**: `Broadcaster::new(config)`
//! 2. **Process-wide instance**: `subcast::global_with(config)` (first caller wins)
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the event [`Bus`](crate::Bus)

use crate::Payload;

/// Configuration for a [`Broadcaster`](crate::Broadcaster).
///
/// ## Field semantics
/// - `bus_capacity`: Diagnostic event ring buffer size (min 1; clamped by Bus)
/// - `isolate_panics`: Catch panicking subscriber callbacks and keep delivering
/// - `initial_payload`: Payload reported by `Broadcaster::payload()` before the first publish
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the diagnostic event broadcast channel.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,

    /// Whether a panic inside a subscriber callback is contained.
    ///
    /// - `true`: the panic is caught, reported as
    ///   [`DeliveryError::Panicked`](crate::DeliveryError::Panicked) and the
    ///   notification pass continues with the next subscriber
    /// - `false`: the panic unwinds out of `publish`
    pub isolate_panics: bool,

    /// Payload held by the broadcaster before anything is published.
    pub initial_payload: Payload,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `isolate_panics = true`
    /// - `initial_payload = ""`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            isolate_panics: true,
            initial_payload: Payload::from(""),
        }
    }
}
