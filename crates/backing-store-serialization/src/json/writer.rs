use super::JsonWriterOptions;
use crate::content_type::normalize;
use crate::{
    CodecError, CodecResult, SerializationHooks, SerializationWriter, SerializationWriterFactory,
    CONTENT_TYPE_JSON,
};
use backing_store::{BackedModel, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value as JsonValue};
use std::sync::Arc;

/// Identity of a model, by the store it owns.
fn model_id(model: &dyn BackedModel) -> usize {
    Arc::as_ptr(model.backing_store()) as *const () as usize
}

enum Frame {
    Object(Map<String, JsonValue>),
    Array(Vec<JsonValue>),
}

/// Builds a JSON document from models and values.
///
/// Objects are written from the model's store enumeration, so a store in
/// changed-only mode yields a partial document. A model that is already open
/// further up the document cannot be written again.
pub struct JsonSerializationWriter {
    options: JsonWriterOptions,
    hooks: SerializationHooks,
    stack: Vec<Frame>,
    open: Vec<usize>,
    root: Option<JsonValue>,
}

impl JsonSerializationWriter {
    pub fn new(options: JsonWriterOptions) -> Self {
        Self {
            options,
            hooks: SerializationHooks::default(),
            stack: Vec::new(),
            open: Vec::new(),
            root: None,
        }
    }

    fn put(&mut self, key: Option<&str>, value: JsonValue) -> CodecResult<()> {
        match self.stack.last_mut() {
            Some(Frame::Object(map)) => {
                let key = key.ok_or_else(|| {
                    CodecError::invalid_state("object members must be written with a key")
                })?;
                map.insert(key.to_owned(), value);
            }
            Some(Frame::Array(items)) => items.push(value),
            None => match key {
                Some(key) => match self.root.get_or_insert_with(|| JsonValue::Object(Map::new())) {
                    JsonValue::Object(map) => {
                        map.insert(key.to_owned(), value);
                    }
                    _ => {
                        return Err(CodecError::invalid_state(
                            "keyed value written after a non-object root",
                        ))
                    }
                },
                None => {
                    if self.root.is_some() {
                        return Err(CodecError::invalid_state("root value already written"));
                    }
                    self.root = Some(value);
                }
            },
        }
        Ok(())
    }

    fn write_fields(
        &mut self,
        model: &dyn BackedModel,
        hooks: &SerializationHooks,
    ) -> CodecResult<()> {
        if let Some(start) = &hooks.start_object {
            start(model, self)?;
        }
        for (key, value) in model.backing_store().enumerate() {
            self.write_value(Some(&key), &value)?;
        }
        Ok(())
    }

    fn write_collection(&mut self, key: Option<&str>, items: Vec<Value>) -> CodecResult<()> {
        self.stack.push(Frame::Array(Vec::with_capacity(items.len())));
        let result = items
            .iter()
            .try_for_each(|item| self.write_value(None, item));
        let frame = self.stack.pop();
        result?;
        match frame {
            Some(Frame::Array(items)) => self.put(key, JsonValue::Array(items)),
            _ => Err(CodecError::invalid_state("unbalanced array frame")),
        }
    }
}

impl Default for JsonSerializationWriter {
    fn default() -> Self {
        Self::new(JsonWriterOptions::default())
    }
}

impl SerializationWriter for JsonSerializationWriter {
    fn write_value(&mut self, key: Option<&str>, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => {
                if matches!(self.stack.last(), Some(Frame::Array(_))) {
                    self.put(key, JsonValue::Null)
                } else {
                    Ok(())
                }
            }
            Value::Bool(b) => self.put(key, JsonValue::Bool(*b)),
            Value::Int(i) => self.put(key, JsonValue::from(*i)),
            Value::Float(f) => {
                let number = Number::from_f64(*f).ok_or_else(|| {
                    CodecError::invalid_value(format!("{f} is not representable in JSON"))
                })?;
                self.put(key, JsonValue::Number(number))
            }
            Value::String(s) => self.put(key, JsonValue::String(s.clone())),
            Value::Bytes(bytes) => self.put(key, JsonValue::String(STANDARD.encode(bytes))),
            Value::Model(model) => self.write_object_value(key, &**model),
            Value::Collection(items) => self.write_collection(key, items.to_vec()),
        }
    }

    fn write_null_value(&mut self, key: Option<&str>) -> CodecResult<()> {
        self.put(key, JsonValue::Null)
    }

    fn write_object_value(
        &mut self,
        key: Option<&str>,
        model: &dyn BackedModel,
    ) -> CodecResult<()> {
        let id = model_id(model);
        if self.open.contains(&id) {
            return Err(CodecError::invalid_state("cyclic model graph"));
        }

        let hooks = self.hooks.clone();
        if let Some(before) = &hooks.before_object {
            before(model);
        }

        self.open.push(id);
        self.stack.push(Frame::Object(Map::new()));
        let result = self.write_fields(model, &hooks);
        let frame = self.stack.pop();
        self.open.pop();

        // The after hook restores the model's mode even when writing failed.
        if let Some(after) = &hooks.after_object {
            after(model);
        }
        result?;

        match frame {
            Some(Frame::Object(map)) => self.put(key, JsonValue::Object(map)),
            _ => Err(CodecError::invalid_state("unbalanced object frame")),
        }
    }

    fn hooks(&self) -> &SerializationHooks {
        &self.hooks
    }

    fn set_hooks(&mut self, hooks: SerializationHooks) {
        self.hooks = hooks;
    }

    fn content(&self) -> CodecResult<Vec<u8>> {
        if !self.stack.is_empty() {
            return Err(CodecError::invalid_state("content requested inside an open value"));
        }
        let root = self.root.as_ref().unwrap_or(&JsonValue::Null);
        let bytes = if self.options.pretty {
            serde_json::to_vec_pretty(root)?
        } else {
            serde_json::to_vec(root)?
        };
        Ok(bytes)
    }
}

/// Creates [`JsonSerializationWriter`]s sharing one set of options.
#[derive(Debug, Clone, Default)]
pub struct JsonSerializationWriterFactory {
    options: JsonWriterOptions,
}

impl JsonSerializationWriterFactory {
    pub fn new(options: JsonWriterOptions) -> Self {
        Self { options }
    }
}

impl SerializationWriterFactory for JsonSerializationWriterFactory {
    fn valid_content_type(&self) -> &str {
        CONTENT_TYPE_JSON
    }

    fn serialization_writer(
        &self,
        content_type: &str,
    ) -> CodecResult<Box<dyn SerializationWriter>> {
        if normalize(content_type) != CONTENT_TYPE_JSON {
            return Err(CodecError::unsupported_content_type(content_type));
        }
        Ok(Box::new(JsonSerializationWriter::new(self.options.clone())))
    }
}
