//! # Broadcaster: single-topic, synchronous payload fan-out.
//!
//! The [`Broadcaster`] owns the registration sequence and the current payload.
//! `publish` stores the payload and runs one notification pass over the
//! subscribers registered at that moment, inline, in registration order.
//!
//! ## Responsibilities
//! - **Registration**: `subscribe` appends (no dedup), `unsubscribe` removes the
//!   first matching entry or does nothing
//! - **Delivery**: snapshot under the lock, deliver without it
//! - **Consistency**: removal during a pass never skips or repeats other subscribers
//! - **Diagnostics**: `count`, `subscribers`, and the event bus (`events()`)
//!
//! ## Pass semantics
//! ```text
//! publish("Y")
//!   lock { payload = "Y"; slots = registry.snapshot() }
//!   for slot in slots:            // order of registration at pass start
//!     detached since snapshot? ──► skip
//!     subscriber dropped?      ──► skip
//!     subscriber.on_update("Y")   // may detach itself or others, subscribe, publish
//!   lock { registry.prune() }
//!   bus ◄── Published{count, delivered}
//! ```
//! Subscribers registered during a pass first hear from the next pass.
//!
//! ## Threads
//! All state sits behind one `Mutex`. Concurrent `publish` calls from several
//! threads each deliver their own payload once to every subscriber that stays
//! attached; the interleaving between passes is unspecified.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::Payload;
use crate::core::config::Config;
use crate::core::registry::Registry;
use crate::error::{DeliveryError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscriber, SubscriberId};

/// Mutable state guarded by the broadcaster's lock.
struct State {
    registry: Registry,
    payload: Payload,
}

struct Shared {
    state: Mutex<State>,
    bus: Bus,
    config: Config,
}

/// Outcome of one notification pass.
///
/// Diagnostic only: publishing itself cannot fail.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers whose callback ran to completion.
    pub delivered: usize,
    /// Snapshot entries not visited (detached during the pass or dropped).
    pub skipped: usize,
    /// Callbacks that panicked (only with `Config::isolate_panics`).
    pub failures: Vec<DeliveryError>,
}

impl PublishReport {
    /// True if no callback failed.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Handle to a broadcaster.
///
/// Cheap to clone; clones share the same registrations and payload.
#[derive(Clone)]
pub struct Broadcaster {
    shared: Arc<Shared>,
}

/// Non-owning handle to a [`Broadcaster`].
#[derive(Clone, Default)]
pub struct WeakBroadcaster {
    shared: Weak<Shared>,
}

impl WeakBroadcaster {
    /// Returns the broadcaster if it is still alive.
    pub fn upgrade(&self) -> Option<Broadcaster> {
        self.shared.upgrade().map(|shared| Broadcaster { shared })
    }
}

impl Broadcaster {
    /// Creates an empty broadcaster.
    pub fn new(config: Config) -> Self {
        let bus = Bus::new(config.bus_capacity_clamped());
        let state = State {
            registry: Registry::default(),
            payload: config.initial_payload.clone(),
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                bus,
                config,
            }),
        }
    }

    /// Creates a non-owning handle.
    pub fn downgrade(&self) -> WeakBroadcaster {
        WeakBroadcaster {
            shared: Arc::downgrade(&self.shared),
        }
    }

    // Callbacks never run under the lock, so poisoning can only come from a
    // panic in this module; the state is still consistent in that case.
    fn state(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `subscriber` to the end of the registration sequence.
    ///
    /// No deduplication: subscribing twice means two deliveries per publish
    /// until both registrations are removed. Takes effect from the next pass.
    pub fn subscribe(&self, subscriber: &Arc<Subscriber>) {
        let count = {
            let mut state = self.state();
            state.registry.prune();
            state.registry.push(subscriber);
            state.registry.len()
        };
        trace!(subscriber = %subscriber.id(), count, "subscribed");
        self.shared.bus.publish(
            Event::new(EventKind::Subscribed)
                .with_subscriber(subscriber.id(), subscriber.name())
                .with_count(count),
        );
    }

    /// Removes the first registration of `subscriber`.
    ///
    /// Like `subscribe`, first prunes registrations of dropped subscribers, so
    /// the event `count` always matches [`Broadcaster::count`].
    ///
    /// Returns whether something was removed. Unsubscribing a subscriber that
    /// is not registered is a no-op. Safe to call from inside a callback of an
    /// ongoing pass: the removed registration is not visited afterwards.
    pub fn unsubscribe(&self, subscriber: &Subscriber) -> bool {
        let (removed, count) = {
            let mut state = self.state();
            state.registry.prune();
            let removed = state.registry.remove_first(subscriber.id());
            (removed, state.registry.len())
        };
        if removed {
            trace!(subscriber = %subscriber.id(), count, "unsubscribed");
            self.shared.bus.publish(
                Event::new(EventKind::Unsubscribed)
                    .with_subscriber(subscriber.id(), subscriber.name())
                    .with_count(count),
            );
        }
        removed
    }

    /// Sets the payload and notifies every subscriber registered right now.
    ///
    /// Returns after every callback of this pass has run.
    pub fn publish(&self, payload: impl Into<Payload>) -> PublishReport {
        let payload = payload.into();
        let slots = {
            let mut state = self.state();
            state.payload = payload.clone();
            state.registry.snapshot()
        };
        debug!(count = slots.len(), "notifying subscribers");

        let mut report = PublishReport::default();
        for slot in &slots {
            if !slot.is_attached() {
                trace!(subscriber = %slot.id, "detached during pass; skipped");
                report.skipped += 1;
                continue;
            }
            let Some(subscriber) = slot.upgrade() else {
                report.skipped += 1;
                continue;
            };
            match self.deliver(&subscriber, &payload) {
                Ok(()) => report.delivered += 1,
                Err(err) => report.failures.push(err),
            }
        }

        let count = {
            let mut state = self.state();
            state.registry.prune();
            state.registry.len()
        };
        debug!(delivered = report.delivered, skipped = report.skipped, count, "pass finished");
        self.shared.bus.publish(
            Event::new(EventKind::Published)
                .with_payload(payload)
                .with_count(count)
                .with_delivered(report.delivered),
        );
        report
    }

    fn deliver(&self, subscriber: &Subscriber, payload: &Payload) -> Result<(), DeliveryError> {
        if !self.shared.config.isolate_panics {
            subscriber.on_update(payload);
            return Ok(());
        }
        match panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_update(payload))) {
            Ok(()) => Ok(()),
            Err(panic_err) => {
                let info = panic_info(&*panic_err);
                warn!(subscriber = %subscriber.id(), name = subscriber.name(), info = %info, "subscriber panicked");
                self.shared.bus.publish(
                    Event::subscriber_panicked(subscriber.name(), info.clone())
                        .with_subscriber(subscriber.id(), subscriber.name()),
                );
                Err(DeliveryError::Panicked {
                    subscriber: subscriber.id(),
                    name: subscriber.name(),
                    info,
                })
            }
        }
    }

    /// The last published payload (or `Config::initial_payload`).
    pub fn payload(&self) -> Payload {
        self.state().payload.clone()
    }

    /// Number of live registrations.
    ///
    /// Registrations of dropped subscribers are pruned first.
    pub fn count(&self) -> usize {
        let mut state = self.state();
        state.registry.prune();
        state.registry.len()
    }

    /// True if there are no live registrations.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// True if `id` has at least one live registration.
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.state().registry.contains(id)
    }

    /// Ids of live registrations, in notification order.
    pub fn subscribers(&self) -> Vec<SubscriberId> {
        self.state().registry.ids()
    }

    /// Creates a receiver for diagnostic events emitted after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    /// The diagnostic event bus.
    pub fn bus(&self) -> &Bus {
        &self.shared.bus
    }

    /// Configuration this broadcaster was created with.
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// True if both handles refer to the same broadcaster.
    pub fn ptr_eq(&self, other: &Broadcaster) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Broadcaster")
            .field("payload", &state.payload)
            .field("registrations", &state.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubscribeFn;
    use std::sync::OnceLock;

    type Journal = Arc<Mutex<Vec<(SubscriberId, String)>>>;

    fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn entries(j: &Journal) -> Vec<(SubscriberId, String)> {
        j.lock().unwrap().clone()
    }

    fn recording(b: &Broadcaster, j: &Journal) -> Arc<Subscriber> {
        let j = j.clone();
        Subscriber::attach(
            b,
            SubscribeFn::new("recorder", move |s: &Subscriber, p: &Payload| {
                j.lock().unwrap().push((s.id(), p.to_string()));
            }),
        )
    }

    fn self_detaching(b: &Broadcaster, j: &Journal) -> Arc<Subscriber> {
        let j = j.clone();
        Subscriber::attach(
            b,
            SubscribeFn::new("self-detach", move |s: &Subscriber, p: &Payload| {
                j.lock().unwrap().push((s.id(), p.to_string()));
                s.detach();
            }),
        )
    }

    fn delivered(ids: &[&Arc<Subscriber>], payload: &str) -> Vec<(SubscriberId, String)> {
        ids.iter().map(|s| (s.id(), payload.to_string())).collect()
    }

    #[test]
    fn test_publish_in_registration_order() {
        let b = Broadcaster::default();
        let j = journal();
        let s1 = recording(&b, &j);
        let s2 = recording(&b, &j);
        let s3 = recording(&b, &j);

        let report = b.publish("X");

        assert_eq!(entries(&j), delivered(&[&s1, &s2, &s3], "X"));
        for s in [&s1, &s2, &s3] {
            assert_eq!(s.last_seen().as_deref(), Some("X"));
        }
        assert_eq!(report.delivered, 3);
        assert_eq!(report.skipped, 0);
        assert!(report.is_clean());
        assert_eq!(&*b.payload(), "X");
    }

    #[test]
    fn test_self_detach_mid_pass() {
        let b = Broadcaster::default();
        let j = journal();
        let s1 = recording(&b, &j);
        let s2 = self_detaching(&b, &j);
        let s3 = recording(&b, &j);

        b.publish("X");
        assert_eq!(entries(&j), delivered(&[&s1, &s2, &s3], "X"));
        assert_eq!(b.count(), 2);

        j.lock().unwrap().clear();
        b.publish("Y");
        assert_eq!(entries(&j), delivered(&[&s1, &s3], "Y"));
        assert_eq!(s2.last_seen().as_deref(), Some("X"));
        assert_eq!(b.count(), 2);
    }

    #[test]
    fn test_first_subscriber_self_detach_keeps_neighbours() {
        let b = Broadcaster::default();
        let j = journal();
        let s1 = self_detaching(&b, &j);
        let s2 = self_detaching(&b, &j);
        let s3 = recording(&b, &j);

        b.publish("X");

        assert_eq!(entries(&j), delivered(&[&s1, &s2, &s3], "X"));
        assert_eq!(b.subscribers(), vec![s3.id()]);
    }

    #[test]
    fn test_detach_of_unvisited_subscriber_mid_pass() {
        let b = Broadcaster::default();
        let j = journal();
        let victim: Arc<OnceLock<Arc<Subscriber>>> = Arc::new(OnceLock::new());

        let s1 = {
            let j = j.clone();
            let victim = victim.clone();
            Subscriber::attach(
                &b,
                SubscribeFn::new("evictor", move |s: &Subscriber, p: &Payload| {
                    j.lock().unwrap().push((s.id(), p.to_string()));
                    if let Some(v) = victim.get() {
                        v.detach();
                    }
                }),
            )
        };
        let s2 = recording(&b, &j);
        let s3 = recording(&b, &j);
        victim.set(s3.clone()).unwrap();

        let report = b.publish("X");

        assert_eq!(entries(&j), delivered(&[&s1, &s2], "X"));
        assert_eq!(report.delivered, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(s3.last_seen(), None);
        assert_eq!(b.count(), 2);
    }

    #[test]
    fn test_unsubscribe_absent_is_noop() {
        let b = Broadcaster::default();
        let other = Broadcaster::default();
        let never_added = recording(&other, &journal());

        assert!(!b.unsubscribe(&never_added));
        assert_eq!(b.count(), 0);
        assert!(b.is_empty());

        let j = journal();
        let s = recording(&b, &j);
        assert!(b.unsubscribe(&s));
        assert!(!b.unsubscribe(&s));
        assert_eq!(b.count(), 0);
    }

    #[test]
    fn test_duplicate_subscribe_delivers_twice() {
        let b = Broadcaster::default();
        let j = journal();
        let s = recording(&b, &j);
        b.subscribe(&s);
        assert_eq!(b.count(), 2);

        b.publish("A");
        assert_eq!(entries(&j), delivered(&[&s, &s], "A"));

        s.detach();
        assert_eq!(b.count(), 1);
        assert!(s.is_attached());
        j.lock().unwrap().clear();
        b.publish("B");
        assert_eq!(entries(&j), delivered(&[&s], "B"));

        s.detach();
        assert!(!s.is_attached());
        j.lock().unwrap().clear();
        b.publish("C");
        assert!(entries(&j).is_empty());
    }

    #[test]
    fn test_duplicate_self_detach_removes_one_registration_per_call() {
        let b = Broadcaster::default();
        let j = journal();
        let s = self_detaching(&b, &j);
        b.subscribe(&s);

        // first visit removes the first entry; the second entry is still attached
        b.publish("A");
        assert_eq!(entries(&j), delivered(&[&s, &s], "A"));
        assert_eq!(b.count(), 0);
    }

    #[test]
    fn test_subscribe_during_pass_waits_for_next_pass() {
        let b = Broadcaster::default();
        let j = journal();
        let late: Arc<Mutex<Vec<Arc<Subscriber>>>> = Arc::new(Mutex::new(Vec::new()));

        let recruiter = {
            let b2 = b.clone();
            let j2 = j.clone();
            let late = late.clone();
            Subscriber::attach(
                &b,
                SubscribeFn::new("recruiter", move |s: &Subscriber, p: &Payload| {
                    j2.lock().unwrap().push((s.id(), p.to_string()));
                    if late.lock().unwrap().is_empty() {
                        let newcomer = recording(&b2, &j2);
                        late.lock().unwrap().push(newcomer);
                    }
                }),
            )
        };

        b.publish("first");
        assert_eq!(entries(&j), delivered(&[&recruiter], "first"));
        assert_eq!(b.count(), 2);

        let newcomer = late.lock().unwrap()[0].clone();
        j.lock().unwrap().clear();
        b.publish("second");
        assert_eq!(entries(&j), delivered(&[&recruiter, &newcomer], "second"));
    }

    #[test]
    fn test_dropped_subscriber_counts_as_detached() {
        let b = Broadcaster::default();
        let j = journal();
        let s1 = recording(&b, &j);
        let s2 = recording(&b, &j);
        assert_eq!(b.count(), 2);

        drop(s2);
        assert_eq!(b.count(), 1);

        let report = b.publish("X");
        assert_eq!(entries(&j), delivered(&[&s1], "X"));
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_dropped_mid_pass_is_skipped() {
        let b = Broadcaster::default();
        let j = journal();
        let holder: Arc<Mutex<Option<Arc<Subscriber>>>> = Arc::new(Mutex::new(None));

        let s1 = {
            let holder = holder.clone();
            let j = j.clone();
            Subscriber::attach(
                &b,
                SubscribeFn::new("dropper", move |s: &Subscriber, p: &Payload| {
                    j.lock().unwrap().push((s.id(), p.to_string()));
                    holder.lock().unwrap().take();
                }),
            )
        };
        let s2 = recording(&b, &j);
        let s2_id = s2.id();
        *holder.lock().unwrap() = Some(s2);
        let s3 = recording(&b, &j);

        let report = b.publish("X");

        assert_eq!(entries(&j), delivered(&[&s1, &s3], "X"));
        assert_eq!(report.skipped, 1);
        assert!(!b.contains(s2_id));
        assert_eq!(b.count(), 2);
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let b = Broadcaster::default();
        let mut events = b.events();
        let j = journal();
        let s1 = recording(&b, &j);
        let bad = Subscriber::attach(
            &b,
            SubscribeFn::new("bad", |_: &Subscriber, _: &Payload| panic!("bad subscriber")),
        );
        let s3 = recording(&b, &j);

        let report = b.publish("X");

        assert_eq!(entries(&j), delivered(&[&s1, &s3], "X"));
        assert_eq!(report.delivered, 2);
        assert_eq!(
            report.failures,
            vec![DeliveryError::Panicked {
                subscriber: bad.id(),
                name: "bad",
                info: "bad subscriber".to_string(),
            }]
        );
        assert_eq!(bad.last_seen().as_deref(), Some("X"));

        let panicked = std::iter::from_fn(|| events.try_recv().ok())
            .find(|ev| ev.kind == EventKind::SubscriberPanicked)
            .unwrap();
        assert_eq!(panicked.subscriber, Some(bad.id()));
        assert_eq!(panicked.reason.as_deref(), Some("bad subscriber"));
    }

    #[test]
    fn test_panic_propagates_without_isolation() {
        let b = Broadcaster::new(Config {
            isolate_panics: false,
            ..Config::default()
        });
        let _bad = Subscriber::attach(
            &b,
            SubscribeFn::new("bad", |_: &Subscriber, _: &Payload| panic!("fail fast")),
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| b.publish("X")));
        assert!(result.is_err());

        // lock was not held by the callback
        assert_eq!(b.count(), 1);
        assert_eq!(&*b.payload(), "X");
    }

    #[test]
    fn test_reentrant_publish_from_callback() {
        let b = Broadcaster::default();
        let j = journal();
        let echo = {
            let b2 = b.clone();
            let j2 = j.clone();
            Subscriber::attach(
                &b,
                SubscribeFn::new("echo", move |s: &Subscriber, p: &Payload| {
                    j2.lock().unwrap().push((s.id(), p.to_string()));
                    if &**p == "ping" {
                        b2.publish("pong");
                    }
                }),
            )
        };
        let tail = recording(&b, &j);

        b.publish("ping");

        let expected = vec![
            (echo.id(), "ping".to_string()),
            (echo.id(), "pong".to_string()),
            (tail.id(), "pong".to_string()),
            (tail.id(), "ping".to_string()),
        ];
        assert_eq!(entries(&j), expected);
        assert_eq!(&*b.payload(), "pong");
    }

    #[test]
    fn test_initial_payload_from_config() {
        let b = Broadcaster::new(Config {
            initial_payload: Payload::from("Empty"),
            ..Config::default()
        });
        assert_eq!(&*b.payload(), "Empty");
        assert_eq!(b.config().bus_capacity, 1024);
    }

    #[test]
    fn test_events_follow_operations() {
        let b = Broadcaster::default();
        let mut events = b.events();
        let j = journal();
        let s = recording(&b, &j);
        b.publish("X");
        s.detach();
        s.detach();

        let got: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        let kinds: Vec<_> = got.iter().map(|ev| ev.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Subscribed,
                EventKind::Published,
                EventKind::Unsubscribed
            ]
        );
        assert_eq!(got[0].subscriber, Some(s.id()));
        assert_eq!(got[0].count, Some(1));
        assert_eq!(got[1].payload.as_deref(), Some("X"));
        assert_eq!(got[1].delivered, Some(1));
        assert_eq!(got[2].count, Some(0));
        assert!(got.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    #[test]
    fn test_weak_handle_does_not_keep_broadcaster_alive() {
        let b = Broadcaster::default();
        let weak = b.downgrade();
        let again = weak.upgrade().unwrap();
        assert!(again.ptr_eq(&b));

        drop(again);
        drop(b);
        assert!(weak.upgrade().is_none());
        assert!(WeakBroadcaster::default().upgrade().is_none());
    }

    #[test]
    fn test_attach_drop_churn_does_not_accumulate_entries() {
        let b = Broadcaster::default();
        let mut events = b.events();
        let j = journal();
        let keeper = recording(&b, &j);

        for _ in 0..1000 {
            drop(recording(&b, &j));
        }
        let last = recording(&b, &j);

        assert_eq!(b.state().registry.len(), 2);
        let last_subscribed = std::iter::from_fn(|| events.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::Subscribed)
            .last()
            .unwrap();
        assert_eq!(last_subscribed.subscriber, Some(last.id()));
        assert_eq!(last_subscribed.count, Some(b.count()));
        assert_eq!(b.count(), 2);

        drop(last);
        assert!(b.unsubscribe(&keeper));
        assert_eq!(b.state().registry.len(), 0);
    }

    #[test]
    fn test_concurrent_publishers_deliver_each_payload_once() {
        const THREADS: usize = 4;
        const PER_THREAD: usize = 50;

        let b = Broadcaster::default();
        let j = journal();
        let subs: Vec<_> = (0..3).map(|_| recording(&b, &j)).collect();

        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let b = b.clone();
                scope.spawn(move || {
                    for i in 0..PER_THREAD {
                        b.publish(format!("{t}-{i}"));
                    }
                });
            }
        });

        let got = entries(&j);
        assert_eq!(got.len(), THREADS * PER_THREAD * subs.len());
        for s in &subs {
            let mut mine: Vec<_> = got
                .iter()
                .filter(|(id, _)| *id == s.id())
                .map(|(_, p)| p.clone())
                .collect();
            mine.sort();
            mine.dedup();
            assert_eq!(mine.len(), THREADS * PER_THREAD);
        }
    }
}
