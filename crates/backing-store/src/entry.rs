//! Store entries.

use crate::{Collection, Value};

/// A stored value with its dirty flag.
///
/// Collections additionally remember their length at assignment time so an
/// in-place add or remove can be detected on the next read.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) dirty: bool,
    pub(crate) value: Value,
    pub(crate) tracked_len: Option<usize>,
}

impl Entry {
    pub(crate) fn new(dirty: bool, value: Value) -> Self {
        let tracked_len = value.as_collection().map(Collection::len);
        Self {
            dirty,
            value,
            tracked_len,
        }
    }

    /// Whether a stored collection changed length since it was assigned.
    pub(crate) fn has_drifted(&self) -> bool {
        match (&self.value, self.tracked_len) {
            (Value::Collection(items), Some(len)) => items.len() != len,
            _ => false,
        }
    }
}
