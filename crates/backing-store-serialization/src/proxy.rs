//! Factory wrappers that make codecs aware of backing stores.
//!
//! Wrapping a writer factory makes every writer emit only changed properties
//! (plus explicit nulls for properties cleared since hydration) and leaves the
//! written models clean. Wrapping a parse node factory makes every parsed
//! model come out hydrated, with nothing dirty.

use crate::hooks::{object_hook, start_object_hook};
use crate::{
    CodecResult, ParseHooks, ParseNode, ParseNodeFactory, SerializationHooks,
    SerializationWriter, SerializationWriterFactory,
};
use std::sync::Arc;

/// Hooks that switch each written model into changed-only mode and mark it
/// clean once written.
pub fn backing_store_serialization_hooks() -> SerializationHooks {
    SerializationHooks {
        before_object: Some(object_hook(|model| {
            model.backing_store().set_return_only_changed_values(true);
        })),
        start_object: Some(start_object_hook(|model, writer| {
            for key in model
                .backing_store()
                .enumerate_keys_for_values_changed_to_null()
            {
                writer.write_null_value(Some(&key))?;
            }
            Ok(())
        })),
        after_object: Some(object_hook(|model| {
            let store = model.backing_store();
            store.set_return_only_changed_values(false);
            store.set_initialization_completed(true);
        })),
    }
}

/// Hooks that suspend change tracking while a model is filled.
pub fn backing_store_parse_hooks() -> ParseHooks {
    ParseHooks {
        before_assign: Some(object_hook(|model| {
            model.backing_store().set_initialization_completed(false);
        })),
        after_assign: Some(object_hook(|model| {
            model.backing_store().set_initialization_completed(true);
        })),
    }
}

/// Writer factory that installs [`backing_store_serialization_hooks`] on every
/// writer produced by the wrapped factory.
pub struct BackingStoreSerializationWriterProxyFactory {
    concrete: Arc<dyn SerializationWriterFactory>,
}

impl BackingStoreSerializationWriterProxyFactory {
    pub fn new(concrete: Arc<dyn SerializationWriterFactory>) -> Self {
        Self { concrete }
    }
}

impl SerializationWriterFactory for BackingStoreSerializationWriterProxyFactory {
    fn valid_content_type(&self) -> &str {
        self.concrete.valid_content_type()
    }

    fn serialization_writer(
        &self,
        content_type: &str,
    ) -> CodecResult<Box<dyn SerializationWriter>> {
        let mut writer = self.concrete.serialization_writer(content_type)?;
        let hooks = writer
            .hooks()
            .clone()
            .chain(backing_store_serialization_hooks());
        writer.set_hooks(hooks);
        Ok(writer)
    }
}

/// Parse node factory that installs [`backing_store_parse_hooks`] on every
/// node produced by the wrapped factory.
pub struct BackingStoreParseNodeFactory {
    concrete: Arc<dyn ParseNodeFactory>,
}

impl BackingStoreParseNodeFactory {
    pub fn new(concrete: Arc<dyn ParseNodeFactory>) -> Self {
        Self { concrete }
    }
}

impl ParseNodeFactory for BackingStoreParseNodeFactory {
    fn valid_content_type(&self) -> &str {
        self.concrete.valid_content_type()
    }

    fn parse_node(&self, content_type: &str, content: &[u8]) -> CodecResult<Box<dyn ParseNode>> {
        let mut node = self.concrete.parse_node(content_type, content)?;
        let hooks = node.hooks().clone().chain(backing_store_parse_hooks());
        node.set_hooks(hooks);
        Ok(node)
    }
}
