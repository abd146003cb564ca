//! Change-tracking backing store for generated API client models.
//!
//! Each model keeps its properties in a [`BackingStore`]. The store remembers
//! which properties were written since the model was last declared hydrated,
//! so a serializer can send only the changed subset (a partial update).
//!
//! # Core Concepts
//!
//! - **BackingStore**: key/value store with per-entry dirty flags
//! - **BackedModel**: capability of a model that owns a store
//! - **Value**: scalars, blobs, nested models, and shared collections
//! - **Subscriber**: callback fired synchronously on every write
//! - **Propagation**: a nested model's change re-dirties the parent property
//!   that holds it, recursively up to the root
//! - **Consistency repair**: before reads in changed-only mode, collections
//!   that grew or shrank in place are re-marked dirty
//!
//! # Quick Start
//!
//! ```
//! use backing_store::{BackingStore, BackingStoreExt, InMemoryBackingStore, Value};
//!
//! let store = InMemoryBackingStore::new();
//!
//! // Hydrate from wire data: nothing is dirty afterwards.
//! store.set_initialization_completed(false);
//! store.set_value("id", "u-1").unwrap();
//! store.set_value("name", "Ada").unwrap();
//! store.set_initialization_completed(true);
//!
//! // Mutate one property.
//! store.set_value("name", "Grace").unwrap();
//!
//! // Only the change is reported.
//! store.set_return_only_changed_values(true);
//! assert_eq!(store.enumerate(), vec![("name".to_string(), Value::from("Grace"))]);
//! ```

mod entry;
mod error;
mod ext;
mod factory;
mod guard;
mod model;
mod store;
mod subscription;
mod value;

pub use error::{value_type_name, StoreError, StoreResult};
pub use ext::BackingStoreExt;
pub use factory::{BackingStoreFactory, InMemoryBackingStoreFactory};
pub use model::BackedModel;
pub use store::{BackingStore, InMemoryBackingStore};
pub use subscription::{subscriber, Subscriber};
pub use value::{Collection, FromValue, Value};
