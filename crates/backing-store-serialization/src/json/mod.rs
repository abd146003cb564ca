//! JSON codec.

mod parse_node;
mod writer;

pub use parse_node::{JsonParseNode, JsonParseNodeFactory};
pub use writer::{JsonSerializationWriter, JsonSerializationWriterFactory};

use serde::{Deserialize, Serialize};

/// Output options for [`JsonSerializationWriter`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonWriterOptions {
    /// Indent the output.
    pub pretty: bool,
}
