//! Change-tracking store.
//!
//! `InMemoryBackingStore` maps property keys to entries carrying a dirty flag.
//! Two switches control it:
//!
//! - `initialization_completed`: writes made while this is `false` are not
//!   dirty (hydration from wire data). Setting it rewrites every dirty flag to
//!   the negation of the new value and pushes the value down into nested models.
//! - `return_only_changed_values`: restricts `get` and `enumerate` to dirty
//!   entries. Setting it pushes the value down into nested models.
//!
//! When a stored value is a backed model (or a collection holding some), the
//! store subscribes to the child's store under the property key. A change in
//! the child re-sets the property on the parent, which marks it dirty and
//! notifies the parent's own subscribers; that is how a mutation deep in a
//! graph surfaces at the root.

use crate::entry::Entry;
use crate::error::require_non_empty;
use crate::guard::{store_id, Walk, WalkGuard};
use crate::subscription::{subscriber, Subscriber, SubscriptionRegistry};
use crate::{StoreResult, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// Key/value store that records which properties changed.
///
/// Object safe so models can hold `Arc<dyn BackingStore>` and the store
/// algorithms can recurse into nested models without knowing their types.
pub trait BackingStore: Send + Sync {
    /// Read a property.
    ///
    /// Returns `None` when the key is absent, or when only changed values are
    /// requested and the entry is clean. Fails on an empty key.
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Write a property and notify subscribers.
    ///
    /// The entry is dirty iff `initialization_completed` is set. Subscribers
    /// fire on every call, even if the value is unchanged. Fails on an empty key.
    fn set(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Every stored key in insertion order, regardless of mode.
    fn keys(&self) -> Vec<String>;

    /// Stored entries, or only the dirty ones in changed-only mode.
    ///
    /// Each call evaluates the current state; in changed-only mode it first
    /// repairs collection-size drift and nested state.
    fn enumerate(&self) -> Vec<(String, Value)>;

    /// Keys whose value was changed to null.
    fn enumerate_keys_for_values_changed_to_null(&self) -> Vec<String>;

    /// Register a callback under a generated id and return the id.
    fn subscribe(&self, callback: Subscriber) -> String;

    /// Register a callback under `id`, replacing any callback with that id.
    fn subscribe_with_id(&self, callback: Subscriber, id: &str) -> StoreResult<()>;

    /// Remove the callback registered under `id`. Returns whether one existed.
    fn unsubscribe(&self, id: &str) -> StoreResult<bool>;

    /// Ids of the registered callbacks, in notification order.
    fn subscription_ids(&self) -> Vec<String>;

    /// Remove every entry. Subscriptions are kept.
    fn clear(&self);

    fn initialization_completed(&self) -> bool;

    /// Declare the owning model hydrated (`true`) or not (`false`).
    fn set_initialization_completed(&self, value: bool);

    fn return_only_changed_values(&self) -> bool;

    /// Switch changed-only mode for this store and the models it holds.
    fn set_return_only_changed_values(&self, value: bool);

    /// Make every loaded property report as changed on the next read.
    ///
    /// Used to send back an object that came from a read without mutating it.
    fn make_sendable(&self) {
        self.set_initialization_completed(false);
    }
}

/// In-memory [`BackingStore`].
///
/// Thread safe; individual operations are atomic but sequences of calls are not.
/// No lock is held while subscriber callbacks run or while other stores are
/// visited.
pub struct InMemoryBackingStore {
    this: Weak<InMemoryBackingStore>,
    entries: RwLock<IndexMap<String, Entry>>,
    subscriptions: SubscriptionRegistry,
    return_only_changed: AtomicBool,
    initialization_completed: AtomicBool,
}

impl InMemoryBackingStore {
    /// Create an empty store. It starts initialized and in full mode.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            entries: RwLock::new(IndexMap::new()),
            subscriptions: SubscriptionRegistry::new(),
            return_only_changed: AtomicBool::new(false),
            initialization_completed: AtomicBool::new(true),
        })
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Whether the entry under `key` is currently dirty, without repair.
    pub fn is_dirty(&self, key: &str) -> bool {
        self.entries.read().get(key).is_some_and(|e| e.dirty)
    }

    #[inline]
    fn id(&self) -> usize {
        store_id(self)
    }

    fn entry(&self, key: &str) -> Option<Entry> {
        self.entries.read().get(key).cloned()
    }

    fn stored_values(&self) -> Vec<Value> {
        self.entries.read().values().map(|e| e.value.clone()).collect()
    }

    /// Restore invariants for `key` before it is read.
    ///
    /// Nested models have every key force-read, which repairs their own
    /// collections in turn. A collection whose length changed since it was
    /// assigned is re-set, marking the property dirty and updating the length.
    fn ensure_consistent(&self, key: &str) {
        let Some(entry) = self.entry(key) else {
            return;
        };
        match &entry.value {
            Value::Collection(items) => {
                for model in items.models() {
                    refresh_nested(&**model.backing_store());
                }
                if entry.has_drifted() {
                    debug!(
                        key,
                        tracked = ?entry.tracked_len,
                        current = items.len(),
                        "collection size changed in place; marking property dirty"
                    );
                    if let Err(err) = self.set(key, entry.value.clone()) {
                        warn!(error = %err, key, "failed to re-set drifted collection");
                    }
                }
            }
            Value::Model(model) => refresh_nested(&**model.backing_store()),
            _ => {}
        }
    }

    /// Subscribe to `child` so its mutations dirty `key` on this store.
    ///
    /// The subscription id is the property key, so re-assigning the property
    /// replaces the callback instead of stacking another one. The callback
    /// holds only weak references.
    fn watch(&self, key: &str, child: &Arc<dyn BackingStore>) {
        let parent = self.this.clone();
        let watched = Arc::downgrade(child);
        let property = key.to_owned();
        let callback = subscriber(move |_, _, _| {
            let (Some(parent), Some(child)) = (parent.upgrade(), watched.upgrade()) else {
                return;
            };
            parent.propagate_from(&property, &*child);
        });
        if let Err(err) = child.subscribe_with_id(callback, key) {
            warn!(error = %err, key, "failed to subscribe to nested store");
        }
    }

    /// Re-set `key` after a change in the nested store `child`.
    fn propagate_from(&self, key: &str, child: &dyn BackingStore) {
        let Some(_guard) = WalkGuard::enter(Walk::Propagation, store_id(child)) else {
            return;
        };
        let Some(current) = self.entry(key).map(|e| e.value) else {
            trace!(key, "property removed; ignoring nested change");
            return;
        };
        if !current.references_store(child) {
            trace!(key, "property no longer holds the changed model; ignoring");
            return;
        }
        child.set_initialization_completed(false);
        if let Err(err) = self.set(key, current) {
            warn!(error = %err, key, "failed to propagate nested change");
        }
    }
}

/// Force-read every key of a nested store so its own repair runs.
fn refresh_nested(store: &dyn BackingStore) {
    let Some(_guard) = WalkGuard::enter(Walk::Repair, store_id(store)) else {
        return;
    };
    for key in store.keys() {
        if let Err(err) = store.get(&key) {
            warn!(error = %err, key, "failed to refresh nested property");
        }
    }
}

/// Backed models held directly by `value` or as collection items.
fn nested_stores(value: &Value) -> Vec<Arc<dyn BackingStore>> {
    match value {
        Value::Model(model) => vec![Arc::clone(model.backing_store())],
        Value::Collection(items) => items
            .models()
            .iter()
            .map(|m| Arc::clone(m.backing_store()))
            .collect(),
        _ => Vec::new(),
    }
}

impl BackingStore for InMemoryBackingStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        require_non_empty("key", key)?;
        let only_changed = self.return_only_changed_values();
        if only_changed {
            self.ensure_consistent(key);
        }
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|e| !only_changed || e.dirty)
            .map(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        require_non_empty("key", key)?;
        let entry = Entry::new(self.initialization_completed(), value.clone());
        let previous = self
            .entries
            .write()
            .insert(key.to_owned(), entry)
            .map(|e| e.value);

        for child in nested_stores(&value) {
            self.watch(key, &child);
        }

        self.subscriptions.notify(key, previous.as_ref(), &value);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    fn enumerate(&self) -> Vec<(String, Value)> {
        let only_changed = self.return_only_changed_values();
        if only_changed {
            for key in self.keys() {
                self.ensure_consistent(&key);
            }
        }
        self.entries
            .read()
            .iter()
            .filter(|(_, e)| !only_changed || e.dirty)
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect()
    }

    fn enumerate_keys_for_values_changed_to_null(&self) -> Vec<String> {
        if self.return_only_changed_values() {
            for key in self.keys() {
                self.ensure_consistent(&key);
            }
        }
        self.entries
            .read()
            .iter()
            .filter(|(_, e)| e.dirty && e.value.is_null())
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn subscribe(&self, callback: Subscriber) -> String {
        self.subscriptions.subscribe(callback)
    }

    fn subscribe_with_id(&self, callback: Subscriber, id: &str) -> StoreResult<()> {
        self.subscriptions.subscribe_with_id(id, callback)
    }

    fn unsubscribe(&self, id: &str) -> StoreResult<bool> {
        self.subscriptions.unsubscribe(id)
    }

    fn subscription_ids(&self) -> Vec<String> {
        self.subscriptions.ids()
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn initialization_completed(&self) -> bool {
        self.initialization_completed.load(Ordering::SeqCst)
    }

    fn set_initialization_completed(&self, value: bool) {
        let Some(_guard) = WalkGuard::enter(Walk::Hydration, self.id()) else {
            return;
        };
        self.initialization_completed.store(value, Ordering::SeqCst);
        for key in self.keys() {
            if let Some(entry) = self.entry(&key) {
                for child in nested_stores(&entry.value) {
                    child.set_initialization_completed(value);
                }
            }
            self.ensure_consistent(&key);
            if let Some(entry) = self.entries.write().get_mut(&key) {
                entry.dirty = !value;
            }
        }
    }

    fn return_only_changed_values(&self) -> bool {
        self.return_only_changed.load(Ordering::SeqCst)
    }

    fn set_return_only_changed_values(&self, value: bool) {
        let Some(_guard) = WalkGuard::enter(Walk::ChangedOnly, self.id()) else {
            return;
        };
        self.return_only_changed.store(value, Ordering::SeqCst);
        for stored in self.stored_values() {
            for child in nested_stores(&stored) {
                child.set_return_only_changed_values(value);
            }
        }
    }
}

impl fmt::Debug for InMemoryBackingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBackingStore")
            .field("entries", &self.len())
            .field("subscriptions", &self.subscriptions.len())
            .field("initialization_completed", &self.initialization_completed())
            .field("return_only_changed_values", &self.return_only_changed_values())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackedModel, BackingStoreExt, Collection, StoreError};
    use parking_lot::Mutex;

    struct Node {
        store: Arc<dyn BackingStore>,
    }

    impl BackedModel for Node {
        fn backing_store(&self) -> &Arc<dyn BackingStore> {
            &self.store
        }
    }

    fn node() -> Arc<Node> {
        Arc::new(Node {
            store: InMemoryBackingStore::new(),
        })
    }

    fn keys_of(entries: Vec<(String, Value)>) -> Vec<String> {
        entries.into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_new_store_defaults() {
        let store = InMemoryBackingStore::new();
        assert!(store.initialization_completed());
        assert!(!store.return_only_changed_values());
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_key_rejected() {
        let store = InMemoryBackingStore::new();
        assert!(matches!(
            store.get(""),
            Err(StoreError::InvalidArgument { argument: "key", .. })
        ));
        assert!(matches!(
            store.set("", Value::Null),
            Err(StoreError::InvalidArgument { argument: "key", .. })
        ));
    }

    #[test]
    fn test_set_then_get() {
        let store = InMemoryBackingStore::new();
        store.set_value("name", "Ada").unwrap();
        assert_eq!(store.get("name").unwrap(), Some(Value::from("Ada")));
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(store.is_dirty("name"));
    }

    #[test]
    fn test_writes_before_initialization_are_clean() {
        let store = InMemoryBackingStore::new();
        store.set_initialization_completed(false);
        store.set_value("id", 1).unwrap();
        assert!(!store.is_dirty("id"));

        store.set_initialization_completed(true);
        store.set_return_only_changed_values(true);
        assert!(store.enumerate().is_empty());
        assert_eq!(store.get("id").unwrap(), None);
    }

    #[test]
    fn test_changed_only_get() {
        let store = InMemoryBackingStore::new();
        store.set_value("a", 1).unwrap();
        store.set_value("b", 2).unwrap();
        store.set_initialization_completed(true);
        store.set_value("b", 3).unwrap();

        store.set_return_only_changed_values(true);
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap(), Some(Value::Int(3)));

        store.set_return_only_changed_values(false);
        assert_eq!(store.get("a").unwrap(), Some(Value::Int(1)));
    }

    #[test]
    fn test_enumerate_keeps_insertion_order() {
        let store = InMemoryBackingStore::new();
        store.set_value("z", 1).unwrap();
        store.set_value("a", 2).unwrap();
        store.set_value("z", 3).unwrap();
        assert_eq!(
            store.enumerate(),
            vec![("z".to_string(), Value::Int(3)), ("a".to_string(), Value::Int(2))]
        );
    }

    #[test]
    fn test_subscribers_fire_with_previous_value() {
        let store = InMemoryBackingStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        store.subscribe(subscriber(move |key, previous, current| {
            log.lock()
                .push((key.to_string(), previous.cloned(), current.clone()));
        }));

        store.set_value("n", 1).unwrap();
        store.set_value("n", 1).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("n".to_string(), None, Value::Int(1)));
        assert_eq!(seen[1], ("n".to_string(), Some(Value::Int(1)), Value::Int(1)));
    }

    #[test]
    fn test_subscribers_fire_in_changed_only_mode() {
        let store = InMemoryBackingStore::new();
        let count = Arc::new(Mutex::new(0));
        let c = Arc::clone(&count);
        store.subscribe(subscriber(move |_, _, _| *c.lock() += 1));
        store.set_return_only_changed_values(true);
        store.set_value("x", true).unwrap();
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_model_property_subscribes_under_key() {
        let parent = InMemoryBackingStore::new();
        let child = node();
        parent.set("manager", Value::model(child.clone())).unwrap();
        parent.set("manager", Value::model(child.clone())).unwrap();
        assert_eq!(child.store.subscription_ids(), vec!["manager"]);
    }

    #[test]
    fn test_value_collection_does_not_subscribe() {
        let parent = InMemoryBackingStore::new();
        let child = node();
        let mixed = Collection::from(vec![Value::from("tag"), Value::model(child.clone())]);
        parent.set("tags", Value::Collection(mixed)).unwrap();
        assert!(child.store.subscription_ids().is_empty());
    }

    #[test]
    fn test_child_change_dirties_parent_property() {
        let parent = InMemoryBackingStore::new();
        let child = node();
        child.store.set_value("name", "old").unwrap();
        parent.set("manager", Value::model(child.clone())).unwrap();
        parent.set_initialization_completed(true);
        assert!(!parent.is_dirty("manager"));
        assert!(child.store.initialization_completed());

        child.store.set_value("name", "new").unwrap();
        assert!(parent.is_dirty("manager"));
        assert!(!child.store.initialization_completed());
    }

    #[test]
    fn test_replaced_child_no_longer_propagates() {
        let parent = InMemoryBackingStore::new();
        let old_child = node();
        let new_child = node();
        parent.set("manager", Value::model(old_child.clone())).unwrap();
        parent.set("manager", Value::model(new_child.clone())).unwrap();
        parent.set_initialization_completed(true);

        old_child.store.set_value("name", "ignored").unwrap();
        assert!(!parent.is_dirty("manager"));

        new_child.store.set_value("name", "seen").unwrap();
        assert!(parent.is_dirty("manager"));
    }

    #[test]
    fn test_dropped_parent_leaves_child_usable() {
        let child = node();
        {
            let parent = InMemoryBackingStore::new();
            parent.set("manager", Value::model(child.clone())).unwrap();
        }
        child.store.set_value("name", "still fine").unwrap();
        assert_eq!(
            child.store.get_as::<String>("name").unwrap().as_deref(),
            Some("still fine")
        );
    }

    #[test]
    fn test_collection_drift_is_repaired_on_read() {
        let store = InMemoryBackingStore::new();
        let tags = Collection::from(vec![Value::from("a")]);
        store.set("tags", Value::Collection(tags.clone())).unwrap();
        store.set_initialization_completed(true);

        tags.push("b");
        assert!(!store.is_dirty("tags"));

        store.set_return_only_changed_values(true);
        assert_eq!(keys_of(store.enumerate()), vec!["tags"]);
        assert!(store.is_dirty("tags"));
    }

    #[test]
    fn test_get_unwraps_collection() {
        let store = InMemoryBackingStore::new();
        let tags = Collection::from(vec![Value::from(1)]);
        store.set("tags", Value::Collection(tags.clone())).unwrap();
        let read: Collection = store.get_as("tags").unwrap().unwrap();
        assert!(read.ptr_eq(&tags));
    }

    #[test]
    fn test_null_assignment_is_tracked() {
        let store = InMemoryBackingStore::new();
        store.set_value("nick", "x").unwrap();
        store.set_initialization_completed(true);
        store.set("nick", Value::Null).unwrap();

        assert_eq!(store.enumerate_keys_for_values_changed_to_null(), vec!["nick"]);
        store.set_return_only_changed_values(true);
        assert_eq!(store.enumerate(), vec![("nick".to_string(), Value::Null)]);
    }

    #[test]
    fn test_clear_keeps_subscriptions() {
        let store = InMemoryBackingStore::new();
        store.subscribe_with_id(subscriber(|_, _, _| {}), "watcher").unwrap();
        store.set_value("a", 1).unwrap();
        store.clear();
        assert!(store.enumerate().is_empty());
        assert_eq!(store.subscription_ids(), vec!["watcher"]);
    }

    #[test]
    fn test_make_sendable_marks_everything_dirty() {
        let store = InMemoryBackingStore::new();
        store.set_initialization_completed(false);
        store.set_value("a", 1).unwrap();
        store.set_value("b", 2).unwrap();
        store.set_initialization_completed(true);

        store.make_sendable();
        store.set_return_only_changed_values(true);
        assert_eq!(keys_of(store.enumerate()), vec!["a", "b"]);
    }

    #[test]
    fn test_cyclic_models_terminate() {
        let a_store = InMemoryBackingStore::new();
        let a = Arc::new(Node {
            store: a_store.clone(),
        });
        let b = node();
        a.store.set("manager", Value::model(b.clone())).unwrap();
        b.store.set("manager", Value::model(a.clone())).unwrap();

        a.store.set_initialization_completed(true);
        a.store.set_return_only_changed_values(true);
        assert!(a.store.enumerate().is_empty());

        a.store.set_return_only_changed_values(false);
        b.store.set_value("name", "b").unwrap();
        assert!(a_store.is_dirty("manager"));

        a.store.make_sendable();
        a.store.set_return_only_changed_values(true);
        assert_eq!(keys_of(a.store.enumerate()), vec!["manager"]);

        // Break the cycle so both stores are released.
        a.store.clear();
    }

    #[test]
    fn test_debug_output() {
        let store = InMemoryBackingStore::new();
        store.set_value("a", 1).unwrap();
        let rendered = format!("{store:?}");
        assert!(rendered.contains("entries: 1"));
    }
}
