//! Store factories.
//!
//! Models receive a factory explicitly instead of reaching for a process-wide
//! default, so tests and applications can swap the store implementation.

use crate::{BackingStore, InMemoryBackingStore};
use std::sync::Arc;

/// Creates backing stores for new model instances.
pub trait BackingStoreFactory: Send + Sync {
    fn create_backing_store(&self) -> Arc<dyn BackingStore>;
}

/// Factory for [`InMemoryBackingStore`].
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryBackingStoreFactory;

impl BackingStoreFactory for InMemoryBackingStoreFactory {
    fn create_backing_store(&self) -> Arc<dyn BackingStore> {
        InMemoryBackingStore::new()
    }
}
