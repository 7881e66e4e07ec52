//! # Blocks
//!
//! A block is one content section of a page: a stable identity, an
//! immutable type name and an open property bag.

use crate::ids::BlockId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open key/value data carried by a block
pub type PropertyBag = serde_json::Map<String, Value>;

/// One content section of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    uid: BlockId,

    #[serde(rename = "type")]
    block_type: String,

    props: PropertyBag,
}

impl Block {
    pub fn new(uid: BlockId, block_type: impl Into<String>, props: PropertyBag) -> Self {
        Self {
            uid,
            block_type: block_type.into(),
            props,
        }
    }

    pub fn uid(&self) -> &BlockId {
        &self.uid
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn props(&self) -> &PropertyBag {
        &self.props
    }

    /// Look up a top-level property
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Top-level string property, if present and a string
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// Items of a nested list property (empty when missing or not a list)
    pub fn list(&self, key: &str) -> &[Value] {
        match self.props.get(key) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    /// Copy of this block with `partial` shallow-merged into its props.
    ///
    /// Nested objects and lists in `partial` replace the existing value
    /// wholesale.
    pub fn merged(&self, partial: &PropertyBag) -> Block {
        let mut props = self.props.clone();
        for (key, value) in partial {
            props.insert(key.clone(), value.clone());
        }

        Block {
            uid: self.uid.clone(),
            block_type: self.block_type.clone(),
            props,
        }
    }
}

/// Block-shaped record exchanged with the backend API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(rename = "type")]
    pub block_type: String,

    #[serde(default)]
    pub props: PropertyBag,
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        Self {
            uid: Some(block.uid.as_str().to_string()),
            block_type: block.block_type.clone(),
            props: block.props.clone(),
        }
    }
}

/// Convert a JSON object literal into a property bag
///
/// Non-object values yield an empty bag.
pub fn bag(value: Value) -> PropertyBag {
    match value {
        Value::Object(map) => map,
        _ => PropertyBag::new(),
    }
}
