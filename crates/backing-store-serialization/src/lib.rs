//! Serialization for backing-store models.
//!
//! Codecs are reached through factories keyed by content type. Wrapping a
//! factory in its store-aware proxy turns full writes into partial updates
//! and makes parsed models come out clean:
//!
//! - [`BackingStoreSerializationWriterProxyFactory`]: writers emit only the
//!   properties changed since hydration, write explicit nulls for cleared
//!   properties, and mark each written model clean
//! - [`BackingStoreParseNodeFactory`]: parse nodes suspend change tracking
//!   while a model is filled
//!
//! [`SerializationContext::enable_backing_store`] installs both proxies on
//! every registered factory.
//!
//! # Example
//!
//! ```
//! use backing_store::{BackedModel, BackingStore, BackingStoreExt, InMemoryBackingStore};
//! use backing_store_serialization::json::JsonWriterOptions;
//! use backing_store_serialization::{ModelFactory, SerializationContext, CONTENT_TYPE_JSON};
//! use std::sync::Arc;
//!
//! struct User {
//!     store: Arc<dyn BackingStore>,
//! }
//!
//! impl BackedModel for User {
//!     fn backing_store(&self) -> &Arc<dyn BackingStore> {
//!         &self.store
//!     }
//! }
//!
//! struct UserFactory;
//!
//! impl ModelFactory for UserFactory {
//!     fn create(&self) -> Arc<dyn BackedModel> {
//!         Arc::new(User { store: InMemoryBackingStore::new() })
//!     }
//! }
//!
//! let mut context = SerializationContext::with_json(JsonWriterOptions::default());
//! context.enable_backing_store();
//!
//! let user = context
//!     .deserialize(CONTENT_TYPE_JSON, br#"{"id":"u-1","name":"Ada"}"#, &UserFactory)
//!     .unwrap();
//! user.backing_store().set_value("name", "Grace").unwrap();
//!
//! let body = context.serialize(CONTENT_TYPE_JSON, user.as_ref()).unwrap();
//! assert_eq!(body, br#"{"name":"Grace"}"#);
//! ```

pub mod content_type;
mod context;
mod error;
mod hooks;
pub mod json;
mod parse_node;
mod proxy;
mod writer;

pub use context::SerializationContext;
pub use error::{CodecError, CodecResult};
pub use hooks::{
    object_hook, start_object_hook, ObjectHook, ParseHooks, SerializationHooks, StartObjectHook,
};
pub use parse_node::{ModelFactory, ParseNode, ParseNodeFactory};
pub use proxy::{
    backing_store_parse_hooks, backing_store_serialization_hooks, BackingStoreParseNodeFactory,
    BackingStoreSerializationWriterProxyFactory,
};
pub use writer::{SerializationWriter, SerializationWriterFactory};

/// Content type served by the [`json`] codec.
pub const CONTENT_TYPE_JSON: &str = "application/json";
