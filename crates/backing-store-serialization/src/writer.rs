//! Serialization writer abstraction.

use crate::{CodecResult, SerializationHooks};
use backing_store::{BackedModel, Value};

/// Writes models and values into a wire format.
///
/// `key` is `None` for the document root and for collection elements.
pub trait SerializationWriter {
    /// Write a value. Nulls are skipped unless they appear inside a collection.
    fn write_value(&mut self, key: Option<&str>, value: &Value) -> CodecResult<()>;

    /// Write an explicit null.
    fn write_null_value(&mut self, key: Option<&str>) -> CodecResult<()>;

    /// Write a model as an object, running the installed hooks around it.
    fn write_object_value(&mut self, key: Option<&str>, model: &dyn BackedModel)
        -> CodecResult<()>;

    /// Hooks currently installed.
    fn hooks(&self) -> &SerializationHooks;

    /// Replace the installed hooks.
    fn set_hooks(&mut self, hooks: SerializationHooks);

    /// Encoded bytes of everything written so far.
    fn content(&self) -> CodecResult<Vec<u8>>;
}

/// Creates writers for one content type.
pub trait SerializationWriterFactory: Send + Sync {
    /// Content type this factory serves, e.g. `application/json`.
    fn valid_content_type(&self) -> &str;

    /// Create a fresh writer.
    fn serialization_writer(&self, content_type: &str)
        -> CodecResult<Box<dyn SerializationWriter>>;
}
