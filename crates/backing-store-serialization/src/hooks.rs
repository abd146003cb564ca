//! Object hooks installed on writers and parse nodes.
//!
//! Hooks let a factory wrapper observe every model a writer or parse node
//! touches without the concrete codec knowing about it. Installing a second
//! set chains it after the first.

use crate::{CodecResult, SerializationWriter};
use backing_store::BackedModel;
use std::sync::Arc;

/// Hook receiving the model being written or parsed.
pub type ObjectHook = Arc<dyn Fn(&dyn BackedModel) + Send + Sync>;

/// Hook run after an object opens and before its fields are written.
pub type StartObjectHook =
    Arc<dyn Fn(&dyn BackedModel, &mut dyn SerializationWriter) -> CodecResult<()> + Send + Sync>;

/// Wrap a closure as an [`ObjectHook`].
pub fn object_hook<F>(hook: F) -> ObjectHook
where
    F: Fn(&dyn BackedModel) + Send + Sync + 'static,
{
    Arc::new(hook)
}

/// Wrap a closure as a [`StartObjectHook`].
pub fn start_object_hook<F>(hook: F) -> StartObjectHook
where
    F: Fn(&dyn BackedModel, &mut dyn SerializationWriter) -> CodecResult<()>
        + Send
        + Sync
        + 'static,
{
    Arc::new(hook)
}

fn chain_object(first: Option<ObjectHook>, second: Option<ObjectHook>) -> Option<ObjectHook> {
    match (first, second) {
        (Some(a), Some(b)) => Some(object_hook(move |model| {
            a(model);
            b(model);
        })),
        (a, None) => a,
        (None, b) => b,
    }
}

fn chain_start(
    first: Option<StartObjectHook>,
    second: Option<StartObjectHook>,
) -> Option<StartObjectHook> {
    match (first, second) {
        (Some(a), Some(b)) => Some(start_object_hook(move |model, writer| {
            a(model, &mut *writer)?;
            b(model, writer)
        })),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Hooks run by a [`SerializationWriter`] around each object it writes.
#[derive(Clone, Default)]
pub struct SerializationHooks {
    /// Before the object is opened.
    pub before_object: Option<ObjectHook>,
    /// After the object is opened, before any field.
    pub start_object: Option<StartObjectHook>,
    /// After the object is closed.
    pub after_object: Option<ObjectHook>,
}

impl SerializationHooks {
    /// Run `self` first, then `next`, at every hook point.
    #[must_use]
    pub fn chain(self, next: SerializationHooks) -> Self {
        Self {
            before_object: chain_object(self.before_object, next.before_object),
            start_object: chain_start(self.start_object, next.start_object),
            after_object: chain_object(self.after_object, next.after_object),
        }
    }
}

/// Hooks run by a [`ParseNode`](crate::ParseNode) around each model it fills.
#[derive(Clone, Default)]
pub struct ParseHooks {
    /// After the model is created, before any field is assigned.
    pub before_assign: Option<ObjectHook>,
    /// After every field is assigned.
    pub after_assign: Option<ObjectHook>,
}

impl ParseHooks {
    /// Run `self` first, then `next`, at every hook point.
    #[must_use]
    pub fn chain(self, next: ParseHooks) -> Self {
        Self {
            before_assign: chain_object(self.before_assign, next.before_assign),
            after_assign: chain_object(self.after_assign, next.after_assign),
        }
    }
}
