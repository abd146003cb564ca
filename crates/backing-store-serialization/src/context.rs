//! Registry of codec factories keyed by content type.

use crate::content_type::normalize;
use crate::json::{JsonParseNodeFactory, JsonSerializationWriterFactory, JsonWriterOptions};
use crate::{
    BackingStoreParseNodeFactory, BackingStoreSerializationWriterProxyFactory, CodecError,
    CodecResult, ModelFactory, ParseNode, ParseNodeFactory, SerializationWriter,
    SerializationWriterFactory,
};
use backing_store::BackedModel;
use std::collections::HashMap;
use std::sync::Arc;

/// Writer and parse node factories available to a client.
///
/// After [`enable_backing_store`](Self::enable_backing_store) every factory,
/// including ones registered later, is wrapped in its store-aware proxy.
#[derive(Clone, Default)]
pub struct SerializationContext {
    writers: HashMap<String, Arc<dyn SerializationWriterFactory>>,
    parsers: HashMap<String, Arc<dyn ParseNodeFactory>>,
    backing_store_enabled: bool,
}

impl std::fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializationContext")
            .field("writers", &self.writers.len())
            .field("parsers", &self.parsers.len())
            .field("backing_store_enabled", &self.backing_store_enabled)
            .finish()
    }
}

impl SerializationContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with the JSON codec registered.
    pub fn with_json(options: JsonWriterOptions) -> Self {
        let mut context = Self::new();
        context.register_writer_factory(Arc::new(JsonSerializationWriterFactory::new(options)));
        context.register_parse_node_factory(Arc::new(JsonParseNodeFactory));
        context
    }

    pub fn register_writer_factory(&mut self, factory: Arc<dyn SerializationWriterFactory>) {
        let factory: Arc<dyn SerializationWriterFactory> = if self.backing_store_enabled {
            Arc::new(BackingStoreSerializationWriterProxyFactory::new(factory))
        } else {
            factory
        };
        self.writers
            .insert(normalize(factory.valid_content_type()), factory);
    }

    pub fn register_parse_node_factory(&mut self, factory: Arc<dyn ParseNodeFactory>) {
        let factory: Arc<dyn ParseNodeFactory> = if self.backing_store_enabled {
            Arc::new(BackingStoreParseNodeFactory::new(factory))
        } else {
            factory
        };
        self.parsers
            .insert(normalize(factory.valid_content_type()), factory);
    }

    /// Wrap every registered factory in its store-aware proxy.
    ///
    /// Calling this more than once has no further effect.
    pub fn enable_backing_store(&mut self) {
        if self.backing_store_enabled {
            return;
        }
        self.backing_store_enabled = true;

        for factory in self.writers.values_mut() {
            *factory = Arc::new(BackingStoreSerializationWriterProxyFactory::new(Arc::clone(
                factory,
            )));
        }
        for factory in self.parsers.values_mut() {
            *factory = Arc::new(BackingStoreParseNodeFactory::new(Arc::clone(factory)));
        }
        tracing::debug!(
            writers = self.writers.len(),
            parsers = self.parsers.len(),
            "backing store serialization enabled"
        );
    }

    pub fn is_backing_store_enabled(&self) -> bool {
        self.backing_store_enabled
    }

    /// Content types with a registered writer factory.
    pub fn writer_content_types(&self) -> Vec<&str> {
        self.writers.keys().map(String::as_str).collect()
    }

    pub fn serialization_writer(
        &self,
        content_type: &str,
    ) -> CodecResult<Box<dyn SerializationWriter>> {
        let factory = self.writers.get(&normalize(content_type)).ok_or_else(|| {
            tracing::warn!(content_type, "no serialization writer registered");
            CodecError::unsupported_content_type(content_type)
        })?;
        factory.serialization_writer(content_type)
    }

    pub fn parse_node(
        &self,
        content_type: &str,
        content: &[u8],
    ) -> CodecResult<Box<dyn ParseNode>> {
        let factory = self.parsers.get(&normalize(content_type)).ok_or_else(|| {
            tracing::warn!(content_type, "no parse node factory registered");
            CodecError::unsupported_content_type(content_type)
        })?;
        factory.parse_node(content_type, content)
    }

    /// Write `model` as a document of `content_type`.
    pub fn serialize(&self, content_type: &str, model: &dyn BackedModel) -> CodecResult<Vec<u8>> {
        let mut writer = self.serialization_writer(content_type)?;
        writer.write_object_value(None, model)?;
        writer.content()
    }

    /// Parse a document of `content_type` into a model built by `factory`.
    pub fn deserialize(
        &self,
        content_type: &str,
        content: &[u8],
        factory: &dyn ModelFactory,
    ) -> CodecResult<Arc<dyn BackedModel>> {
        self.parse_node(content_type, content)?.object_value(factory)
    }
}
