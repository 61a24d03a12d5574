//! # Registration sequence - the authoritative list of subscribers.
//!
//! Registry keeps one entry per `subscribe` call, in call order:
//! - Duplicates are allowed: subscribing twice yields two entries and two deliveries
//! - `remove_first(id)` removes only the earliest entry for that id
//! - Entries hold `Weak<Subscriber>`; entries whose subscriber was dropped are
//!   inert and removed by `prune`
//!
//! ## Snapshot protocol
//! ```text
//! publish ──lock──► snapshot() ──unlock──► for slot in snapshot:
//!                                             ├─ slot.attached? ── no ──► skip
//!                                             ├─ slot.upgrade()? ─ no ──► skip
//!                                             └─ on_update(payload)
//!                                                   └─► (reentrant) remove_first(id)
//!                                                          clears that entry's flag
//! ```
//! Every entry owns an `Arc<AtomicBool>` shared with the snapshot slots taken from
//! it. Removing the entry clears the flag, so a removal during a pass is seen by the
//! traversal without the traversal ever touching the mutable `Vec`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::subscribers::{Subscriber, SubscriberId};

/// One registration.
struct Entry {
    id: SubscriberId,
    target: Weak<Subscriber>,
    attached: Arc<AtomicBool>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }

    fn release(&self) {
        self.attached.store(false, Ordering::Release);
    }
}

/// Immutable view of one registration, taken at the start of a pass.
pub(crate) struct Slot {
    pub(crate) id: SubscriberId,
    target: Weak<Subscriber>,
    attached: Arc<AtomicBool>,
}

impl Slot {
    /// True while the registration this slot was taken from is still in the sequence.
    #[inline]
    pub(crate) fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// The subscriber, if it has not been dropped.
    #[inline]
    pub(crate) fn upgrade(&self) -> Option<Arc<Subscriber>> {
        self.target.upgrade()
    }
}

/// Ordered registration sequence.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    /// Appends a registration at the end of the sequence.
    pub(crate) fn push(&mut self, subscriber: &Arc<Subscriber>) {
        self.entries.push(Entry {
            id: subscriber.id(),
            target: Arc::downgrade(subscriber),
            attached: Arc::new(AtomicBool::new(true)),
        });
    }

    /// Removes the first registration for `id`.
    ///
    /// Returns `false` (and changes nothing) when `id` is not registered.
    pub(crate) fn remove_first(&mut self, id: SubscriberId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.entries.remove(pos).release();
                true
            }
            None => false,
        }
    }

    /// Removes registrations whose subscriber has been dropped.
    ///
    /// Returns the number of removed entries.
    pub(crate) fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| {
            let live = e.is_live();
            if !live {
                e.release();
            }
            live
        });
        before - self.entries.len()
    }

    /// Copies the current sequence for one notification pass.
    pub(crate) fn snapshot(&self) -> Vec<Slot> {
        self.entries
            .iter()
            .map(|e| Slot {
                id: e.id,
                target: e.target.clone(),
                attached: Arc::clone(&e.attached),
            })
            .collect()
    }

    /// True if at least one live registration exists for `id`.
    pub(crate) fn contains(&self, id: SubscriberId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.is_live())
    }

    /// Ids of live registrations, in registration order.
    pub(crate) fn ids(&self) -> Vec<SubscriberId> {
        self.entries
            .iter()
            .filter(|e| e.is_live())
            .map(|e| e.id)
            .collect()
    }

    /// Number of entries, including inert ones not yet pruned.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
