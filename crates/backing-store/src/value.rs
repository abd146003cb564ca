//! Dynamic values held by a backing store.
//!
//! A store slot holds scalars, opaque blobs, references to other backed models,
//! or ordered collections of values. Collections are shared handles: callers may
//! grow or shrink them in place without going through the store, which is why
//! the store tracks their length separately and repairs the dirty flag lazily.

use crate::{BackedModel, BackingStore};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A value stored under a property key.
#[derive(Clone, Default)]
pub enum Value {
    /// Explicit null. A tracked change when assigned, distinct from "absent".
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Opaque binary blob.
    Bytes(Vec<u8>),
    /// Reference to another model that owns a backing store.
    Model(Arc<dyn BackedModel>),
    /// Ordered, shared collection of values.
    Collection(Collection),
}

impl Value {
    /// Wrap a concrete backed model.
    pub fn model<M: BackedModel + 'static>(model: Arc<M>) -> Self {
        Value::Model(model)
    }

    /// Whether this is an explicit null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_model(&self) -> Option<&Arc<dyn BackedModel>> {
        match self {
            Value::Model(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this value is, or directly contains, a model owning `store`.
    pub(crate) fn references_store(&self, store: &dyn BackingStore) -> bool {
        let target = crate::guard::store_id(store);
        match self {
            Value::Model(m) => crate::guard::store_id(&**m.backing_store()) == target,
            Value::Collection(c) => c
                .models()
                .iter()
                .any(|m| crate::guard::store_id(&**m.backing_store()) == target),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Model(a), Value::Model(b)) => Arc::ptr_eq(a, b),
            (Value::Collection(a), Value::Collection(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Value::Model(m) => f
                .debug_tuple("Model")
                .field(&Arc::as_ptr(m).cast::<()>())
                .finish(),
            Value::Collection(c) => f.debug_tuple("Collection").field(c).finish(),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Value::$variant(v $(as $cast)?)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i64 => Int,
    i32 => Int as i64,
    u32 => Int as i64,
    f64 => Float,
    f32 => Float as f64,
    String => String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Collection(Collection::from(items))
    }
}

impl From<Collection> for Value {
    fn from(c: Collection) -> Self {
        Value::Collection(c)
    }
}

impl From<Arc<dyn BackedModel>> for Value {
    fn from(m: Arc<dyn BackedModel>) -> Self {
        Value::Model(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Shared, in-place mutable collection of values.
///
/// Cloning a `Collection` clones the handle, not the items: every clone sees
/// the same elements. The store records the length at assignment time and
/// treats a later length change as a modification of the owning property.
#[derive(Clone, Default)]
pub struct Collection(Arc<RwLock<Vec<Value>>>);

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Append an item in place.
    pub fn push(&self, item: impl Into<Value>) {
        self.0.write().push(item.into());
    }

    /// Insert an item at `index`, shifting later items. Out of range appends.
    pub fn insert(&self, index: usize, item: impl Into<Value>) {
        let mut items = self.0.write();
        let index = index.min(items.len());
        items.insert(index, item.into());
    }

    /// Remove and return the item at `index`, if any.
    pub fn remove(&self, index: usize) -> Option<Value> {
        let mut items = self.0.write();
        (index < items.len()).then(|| items.remove(index))
    }

    pub fn pop(&self) -> Option<Value> {
        self.0.write().pop()
    }

    pub fn clear(&self) {
        self.0.write().clear();
    }

    /// Clone the item at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Clone the current items.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    /// Backed models held by this collection, in order.
    ///
    /// Collections are homogeneous: one whose first item is not a model is a
    /// collection of plain values and holds no models.
    pub fn models(&self) -> Vec<Arc<dyn BackedModel>> {
        if !self.holds_models() {
            return Vec::new();
        }
        self.0
            .read()
            .iter()
            .filter_map(|v| v.as_model().cloned())
            .collect()
    }

    /// Whether the collection holds backed models, judged by its first item.
    pub fn holds_models(&self) -> bool {
        matches!(self.0.read().first(), Some(Value::Model(_)))
    }

    /// Whether two handles share the same underlying items.
    #[inline]
    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Vec<Value>> for Collection {
    fn from(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.read() == *other.0.read()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.read().iter()).finish()
    }
}

/// Conversion from a stored [`Value`] into a Rust type.
///
/// Used by [`BackingStoreExt::get_as`](crate::BackingStoreExt::get_as).
/// On mismatch the original value is handed back so the caller can report it.
pub trait FromValue: Sized {
    /// Name used in mismatch errors.
    const TYPE_NAME: &'static str;

    fn from_value(value: Value) -> Result<Self, Value>;
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_value(value: Value) -> Result<Self, Value> {
        value.as_bool().ok_or(value)
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn from_value(value: Value) -> Result<Self, Value> {
        value.as_i64().ok_or(value)
    }
}

impl FromValue for i32 {
    const TYPE_NAME: &'static str = "integer";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value.as_i64().map(i32::try_from) {
            Some(Ok(v)) => Ok(v),
            _ => Err(value),
        }
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_value(value: Value) -> Result<Self, Value> {
        value.as_f64().ok_or(value)
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl FromValue for Vec<u8> {
    const TYPE_NAME: &'static str = "bytes";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for Collection {
    const TYPE_NAME: &'static str = "collection";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Collection(c) => Ok(c),
            other => Err(other),
        }
    }
}

impl FromValue for Arc<dyn BackedModel> {
    const TYPE_NAME: &'static str = "model";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Model(m) => Ok(m),
            other => Err(other),
        }
    }
}
