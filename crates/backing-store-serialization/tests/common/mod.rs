//! Shared test model: a user with a manager and direct reports.

#![allow(dead_code)]

use backing_store::{
    BackedModel, BackingStore, BackingStoreExt, Collection, InMemoryBackingStore, StoreResult,
    Value,
};
use backing_store_serialization::json::JsonWriterOptions;
use backing_store_serialization::{ModelFactory, SerializationContext, CONTENT_TYPE_JSON};
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub struct User {
    store: Arc<dyn BackingStore>,
}

impl BackedModel for User {
    fn backing_store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }
}

impl User {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            store: InMemoryBackingStore::new(),
        })
    }

    pub fn with(id: &str, name: &str) -> Arc<Self> {
        let user = Self::new();
        user.store.set_value("id", id).unwrap();
        user.store.set_value("name", name).unwrap();
        user
    }

    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    pub fn set_name(&self, name: &str) -> StoreResult<()> {
        self.store.set_value("name", name)
    }

    pub fn set_phone(&self, phone: Option<&str>) -> StoreResult<()> {
        self.store.set_value("phone", phone)
    }
}

pub struct UserFactory;

impl ModelFactory for UserFactory {
    fn create(&self) -> Arc<dyn BackedModel> {
        User::new()
    }

    fn nested(&self, property: &str) -> Option<Arc<dyn ModelFactory>> {
        match property {
            "manager" | "reports" => Some(Arc::new(UserFactory)),
            _ => None,
        }
    }
}

/// JSON context with store-aware proxies enabled.
pub fn context() -> SerializationContext {
    let mut context = SerializationContext::with_json(JsonWriterOptions::default());
    context.enable_backing_store();
    context
}

pub fn parse(context: &SerializationContext, body: JsonValue) -> Arc<dyn BackedModel> {
    let bytes = serde_json::to_vec(&body).unwrap();
    context
        .deserialize(CONTENT_TYPE_JSON, &bytes, &UserFactory)
        .unwrap()
}

pub fn serialize(context: &SerializationContext, model: &dyn BackedModel) -> JsonValue {
    let bytes = context.serialize(CONTENT_TYPE_JSON, model).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Changed-only view of a store, leaving its mode as it was.
pub fn changed_keys(store: &dyn BackingStore) -> Vec<String> {
    let mode = store.return_only_changed_values();
    store.set_return_only_changed_values(true);
    let keys = store.enumerate().into_iter().map(|(k, _)| k).collect();
    store.set_return_only_changed_values(mode);
    keys
}

pub fn model_at(store: &dyn BackingStore, key: &str) -> Arc<dyn BackedModel> {
    store
        .get_as::<Arc<dyn BackedModel>>(key)
        .unwrap()
        .unwrap()
}

pub fn collection_at(store: &dyn BackingStore, key: &str) -> Collection {
    store.get_as::<Collection>(key).unwrap().unwrap()
}

pub fn push_model(collection: &Collection, model: Arc<User>) {
    collection.push(Value::model(model));
}
