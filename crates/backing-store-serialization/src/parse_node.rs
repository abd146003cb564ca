//! Parse node abstraction.

use crate::{CodecResult, ParseHooks};
use backing_store::{BackedModel, Value};
use std::sync::Arc;

/// Creates empty models during parsing.
///
/// Generated clients implement this once per model type. Properties holding
/// nested objects name the factory for the nested type.
pub trait ModelFactory: Send + Sync {
    /// Create an empty model with a fresh store.
    fn create(&self) -> Arc<dyn BackedModel>;

    /// Factory for the object held by `property`, if it holds one.
    fn nested(&self, _property: &str) -> Option<Arc<dyn ModelFactory>> {
        None
    }
}

/// A node of a parsed document.
pub trait ParseNode {
    /// Child node under `key`, if present.
    fn child(&self, key: &str) -> Option<Box<dyn ParseNode>>;

    /// The node as a scalar or a collection of scalars.
    fn value(&self) -> CodecResult<Value>;

    /// Materialize the node as a model, running the installed hooks around it.
    fn object_value(&self, factory: &dyn ModelFactory) -> CodecResult<Arc<dyn BackedModel>>;

    /// Materialize every element of an array node as a model.
    fn collection_of_object_values(
        &self,
        factory: &dyn ModelFactory,
    ) -> CodecResult<Vec<Arc<dyn BackedModel>>>;

    /// Hooks currently installed.
    fn hooks(&self) -> &ParseHooks;

    /// Replace the installed hooks.
    fn set_hooks(&mut self, hooks: ParseHooks);
}

/// Creates parse nodes for one content type.
pub trait ParseNodeFactory: Send + Sync {
    /// Content type this factory serves, e.g. `application/json`.
    fn valid_content_type(&self) -> &str;

    /// Parse `content` into a root node.
    fn parse_node(&self, content_type: &str, content: &[u8]) -> CodecResult<Box<dyn ParseNode>>;
}
