//! Shared test model: a person with scalar, nested, and collection properties.

#![allow(dead_code)]

use backing_store::{
    BackedModel, BackingStore, BackingStoreExt, BackingStoreFactory, Collection,
    InMemoryBackingStoreFactory, StoreResult, Value,
};
use std::sync::Arc;

pub struct Person {
    store: Arc<dyn BackingStore>,
}

impl BackedModel for Person {
    fn backing_store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }
}

impl Person {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            store: InMemoryBackingStoreFactory.create_backing_store(),
        })
    }

    /// Build a person the way a deserializer would: nothing ends up dirty.
    pub fn hydrated(id: &str, name: &str) -> Arc<Self> {
        let person = Self::new();
        person.store.set_initialization_completed(false);
        person.set_id(id).unwrap();
        person.set_name(name).unwrap();
        person.store.set_initialization_completed(true);
        person
    }

    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    pub fn id(&self) -> StoreResult<Option<String>> {
        self.store.get_as("id")
    }

    pub fn set_id(&self, id: &str) -> StoreResult<()> {
        self.store.set_value("id", id)
    }

    pub fn name(&self) -> StoreResult<Option<String>> {
        self.store.get_as("name")
    }

    pub fn set_name(&self, name: &str) -> StoreResult<()> {
        self.store.set_value("name", name)
    }

    pub fn phone(&self) -> StoreResult<Option<String>> {
        self.store.get_as("phone")
    }

    pub fn set_phone(&self, phone: Option<&str>) -> StoreResult<()> {
        self.store.set_value("phone", phone)
    }

    pub fn manager(&self) -> StoreResult<Option<Arc<dyn BackedModel>>> {
        self.store.get_as("manager")
    }

    pub fn set_manager(&self, manager: Arc<Person>) -> StoreResult<()> {
        self.store.set("manager", Value::model(manager))
    }

    pub fn colleagues(&self) -> StoreResult<Option<Collection>> {
        self.store.get_as("colleagues")
    }

    pub fn set_colleagues(&self, colleagues: &[Arc<Person>]) -> StoreResult<Collection> {
        let items: Collection = colleagues.iter().cloned().map(Value::model).collect();
        self.store.set("colleagues", Value::Collection(items.clone()))?;
        Ok(items)
    }
}

/// Keys yielded by `enumerate()`, in order.
pub fn enumerated_keys(store: &dyn BackingStore) -> Vec<String> {
    store.enumerate().into_iter().map(|(k, _)| k).collect()
}

/// Whether `value` is the model `person` (by identity).
pub fn is_person(value: &Value, person: &Arc<Person>) -> bool {
    value
        .as_model()
        .is_some_and(|m| Arc::ptr_eq(m.backing_store(), person.store()))
}
