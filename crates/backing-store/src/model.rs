//! Backed-model capability.

use crate::BackingStore;
use std::sync::Arc;

/// A domain object whose properties live in a [`BackingStore`].
///
/// The store algorithms are blind to concrete model types: this capability is
/// all they need to recurse into nested models and to wire change propagation
/// from a child's store up to the property that holds it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use backing_store::{BackedModel, BackingStore, BackingStoreExt, InMemoryBackingStore};
///
/// struct Person {
///     store: Arc<dyn BackingStore>,
/// }
///
/// impl BackedModel for Person {
///     fn backing_store(&self) -> &Arc<dyn BackingStore> {
///         &self.store
///     }
/// }
///
/// impl Person {
///     fn name(&self) -> backing_store::StoreResult<Option<String>> {
///         self.store.get_as("name")
///     }
///
///     fn set_name(&self, name: &str) -> backing_store::StoreResult<()> {
///         self.store.set_value("name", name)
///     }
/// }
///
/// let person = Person { store: InMemoryBackingStore::new() };
/// person.set_name("Ada").unwrap();
/// assert_eq!(person.name().unwrap().as_deref(), Some("Ada"));
/// ```
pub trait BackedModel: Send + Sync {
    /// The store holding this model's properties.
    fn backing_store(&self) -> &Arc<dyn BackingStore>;
}
