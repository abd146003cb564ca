//! Ordered registry of mutation callbacks.

use crate::error::require_non_empty;
use crate::{StoreResult, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Callback invoked on every store mutation with `(key, previous, current)`.
///
/// `previous` is `None` when the key had no entry before the write.
pub type Subscriber = Arc<dyn Fn(&str, Option<&Value>, &Value) + Send + Sync>;

/// Wrap a closure as a [`Subscriber`].
pub fn subscriber<F>(callback: F) -> Subscriber
where
    F: Fn(&str, Option<&Value>, &Value) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Subscriptions keyed by id, kept in registration order.
///
/// Re-registering an existing id replaces its callback in place, so the
/// position in the notification order is that of the first registration.
#[derive(Default)]
pub(crate) struct SubscriptionRegistry {
    callbacks: RwLock<IndexMap<String, Subscriber>>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register under a freshly generated id and return it.
    pub(crate) fn subscribe(&self, callback: Subscriber) -> String {
        let id = Uuid::now_v7().simple().to_string();
        self.callbacks.write().insert(id.clone(), callback);
        id
    }

    /// Register under `id`, replacing any callback already using it.
    pub(crate) fn subscribe_with_id(&self, id: &str, callback: Subscriber) -> StoreResult<()> {
        require_non_empty("subscription_id", id)?;
        self.callbacks.write().insert(id.to_owned(), callback);
        Ok(())
    }

    /// Remove the callback registered under `id`. Unknown ids are ignored.
    pub(crate) fn unsubscribe(&self, id: &str) -> StoreResult<bool> {
        require_non_empty("subscription_id", id)?;
        Ok(self.callbacks.write().shift_remove(id).is_some())
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.callbacks.read().keys().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Invoke every callback in registration order.
    ///
    /// Callbacks are cloned out first so they may re-enter the registry
    /// (subscribe, unsubscribe, or trigger further notifications).
    pub(crate) fn notify(&self, key: &str, previous: Option<&Value>, current: &Value) {
        let callbacks: Vec<Subscriber> = self.callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(key, previous, current);
        }
    }
}
