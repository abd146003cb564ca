//! Typed convenience access over any [`BackingStore`].

use crate::error::value_type_name;
use crate::{BackingStore, FromValue, StoreError, StoreResult, Value};

/// Typed reads and writes for model property accessors.
///
/// Implemented for every `BackingStore`, including `dyn BackingStore`.
pub trait BackingStoreExt: BackingStore {
    /// Read `key` as `T`.
    ///
    /// Absent, unchanged (in changed-only mode) and null values all read as
    /// `None`. A value of another kind is a [`StoreError::TypeMismatch`].
    fn get_as<T: FromValue>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::from_value(value).map(Some).map_err(|found| {
                StoreError::type_mismatch(key, T::TYPE_NAME, value_type_name(&found))
            }),
        }
    }

    /// Write anything convertible into a [`Value`].
    fn set_value(&self, key: &str, value: impl Into<Value>) -> StoreResult<()> {
        self.set(key, value.into())
    }
}

impl<S: BackingStore + ?Sized> BackingStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryBackingStore;
    use std::sync::Arc;

    #[test]
    fn test_typed_round_trip() {
        let store = InMemoryBackingStore::new();
        store.set_value("age", 42).unwrap();
        store.set_value("name", "Ada").unwrap();
        store.set_value("active", true).unwrap();

        assert_eq!(store.get_as::<i64>("age").unwrap(), Some(42));
        assert_eq!(store.get_as::<String>("name").unwrap().as_deref(), Some("Ada"));
        assert_eq!(store.get_as::<bool>("active").unwrap(), Some(true));
    }

    #[test]
    fn test_type_mismatch_fails_loudly() {
        let store = InMemoryBackingStore::new();
        store.set_value("age", "forty-two").unwrap();
        let err = store.get_as::<i64>("age").unwrap_err();
        assert!(matches!(
            err,
            StoreError::TypeMismatch {
                expected: "integer",
                found: "string",
                ..
            }
        ));
    }

    #[test]
    fn test_null_and_absent_read_as_none() {
        let store = InMemoryBackingStore::new();
        store.set_value("nick", None::<String>).unwrap();
        assert_eq!(store.get_as::<String>("nick").unwrap(), None);
        assert_eq!(store.get_as::<String>("missing").unwrap(), None);
    }

    #[test]
    fn test_works_through_trait_object() {
        let store: Arc<dyn BackingStore> = InMemoryBackingStore::new();
        store.set_value("n", 1).unwrap();
        assert_eq!(store.get_as::<i32>("n").unwrap(), Some(1));
    }
}
