use crate::content_type::normalize;
use crate::{
    CodecError, CodecResult, ModelFactory, ParseHooks, ParseNode, ParseNodeFactory,
    CONTENT_TYPE_JSON,
};
use backing_store::{BackedModel, Collection, Value};
use serde_json::Value as JsonValue;
use std::sync::Arc;

fn shape(node: &JsonValue) -> &'static str {
    match node {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// A node of a parsed JSON document.
///
/// Children inherit the hooks of their parent, so hooks installed on the
/// root apply to every model materialized below it.
#[derive(Clone)]
pub struct JsonParseNode {
    node: JsonValue,
    hooks: ParseHooks,
}

impl JsonParseNode {
    pub fn new(node: JsonValue) -> Self {
        Self {
            node,
            hooks: ParseHooks::default(),
        }
    }

    /// Parse a document from raw bytes.
    pub fn from_slice(content: &[u8]) -> CodecResult<Self> {
        Ok(Self::new(serde_json::from_slice(content)?))
    }

    fn descend(&self, node: JsonValue) -> JsonParseNode {
        JsonParseNode {
            node,
            hooks: self.hooks.clone(),
        }
    }

    /// Convert `raw`, found at `property`, into a store value. Objects at
    /// this position are materialized with `target`.
    fn convert(
        &self,
        property: &str,
        raw: &JsonValue,
        target: Option<&dyn ModelFactory>,
    ) -> CodecResult<Value> {
        Ok(match raw {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Value::Int(i),
                (None, Some(f)) if n.is_f64() => Value::Float(f),
                _ => {
                    return Err(CodecError::invalid_value(format!(
                        "{n} at {property:?} does not fit in a 64-bit integer"
                    )))
                }
            },
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => {
                let collection = Collection::new();
                for item in items {
                    collection.push(self.convert(property, item, target)?);
                }
                Value::Collection(collection)
            }
            JsonValue::Object(_) => {
                let target = target.ok_or_else(|| CodecError::UnmappedObject {
                    property: property.to_owned(),
                })?;
                Value::Model(self.descend(raw.clone()).object_value(target)?)
            }
        })
    }
}

impl ParseNode for JsonParseNode {
    fn child(&self, key: &str) -> Option<Box<dyn ParseNode>> {
        self.node
            .get(key)
            .map(|child| Box::new(self.descend(child.clone())) as Box<dyn ParseNode>)
    }

    fn value(&self) -> CodecResult<Value> {
        self.convert("", &self.node, None)
    }

    fn object_value(&self, factory: &dyn ModelFactory) -> CodecResult<Arc<dyn BackedModel>> {
        let JsonValue::Object(fields) = &self.node else {
            return Err(CodecError::UnexpectedShape {
                expected: "object",
                found: shape(&self.node),
            });
        };

        let model = factory.create();
        if let Some(before) = &self.hooks.before_assign {
            before(model.as_ref());
        }
        let store = model.backing_store();
        for (key, raw) in fields {
            let nested = factory.nested(key);
            let value = self.convert(key, raw, nested.as_deref())?;
            store.set(key, value)?;
        }
        if let Some(after) = &self.hooks.after_assign {
            after(model.as_ref());
        }
        Ok(model)
    }

    fn collection_of_object_values(
        &self,
        factory: &dyn ModelFactory,
    ) -> CodecResult<Vec<Arc<dyn BackedModel>>> {
        let JsonValue::Array(items) = &self.node else {
            return Err(CodecError::UnexpectedShape {
                expected: "array",
                found: shape(&self.node),
            });
        };
        items
            .iter()
            .map(|item| self.descend(item.clone()).object_value(factory))
            .collect()
    }

    fn hooks(&self) -> &ParseHooks {
        &self.hooks
    }

    fn set_hooks(&mut self, hooks: ParseHooks) {
        self.hooks = hooks;
    }
}

/// Creates [`JsonParseNode`]s from `application/json` payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParseNodeFactory;

impl ParseNodeFactory for JsonParseNodeFactory {
    fn valid_content_type(&self) -> &str {
        CONTENT_TYPE_JSON
    }

    fn parse_node(&self, content_type: &str, content: &[u8]) -> CodecResult<Box<dyn ParseNode>> {
        if normalize(content_type) != CONTENT_TYPE_JSON {
            return Err(CodecError::unsupported_content_type(content_type));
        }
        Ok(Box::new(JsonParseNode::from_slice(content)?))
    }
}
