//! Re-entrancy guard for recursive walks across stores.
//!
//! Model graphs may contain cycles (`a.manager = b; b.manager = a`). Every walk
//! that recurses from one store into another registers the store it is about to
//! process; a second attempt on the same thread to walk the same store with the
//! same kind returns `None` and the caller skips it.

use crate::BackingStore;
use std::cell::RefCell;
use std::collections::HashSet;

/// Kind of recursive walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Walk {
    /// Consistency repair reading every key of a nested store.
    Repair,
    /// `initialization_completed` fan-out.
    Hydration,
    /// `return_only_changed_values` fan-out.
    ChangedOnly,
    /// Child-to-parent notification through a cross-store subscription.
    Propagation,
}

thread_local! {
    static ACTIVE: RefCell<HashSet<(Walk, usize)>> = RefCell::new(HashSet::new());
}

/// Identity of a store, stable for its lifetime.
#[inline]
pub(crate) fn store_id(store: &dyn BackingStore) -> usize {
    store as *const dyn BackingStore as *const () as usize
}

/// Marks a store as being walked until dropped.
#[must_use]
pub(crate) struct WalkGuard {
    key: (Walk, usize),
}

impl WalkGuard {
    /// Enter `walk` for the store identified by `id`, unless already inside it.
    pub(crate) fn enter(walk: Walk, id: usize) -> Option<Self> {
        let key = (walk, id);
        let fresh = ACTIVE.with(|active| active.borrow_mut().insert(key));
        if !fresh {
            tracing::trace!(?walk, store = id, "skipping re-entrant store walk");
            return None;
        }
        Some(Self { key })
    }
}

impl Drop for WalkGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().remove(&self.key);
        });
    }
}
