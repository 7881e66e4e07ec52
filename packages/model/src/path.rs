//! # Property Paths
//!
//! Addresses of a single editable value inside a block's props: a top-level
//! key, one field of one row of a nested list, or one entry of an array
//! field inside such a row.
//!
//! Writing through a path is centralized here so leaf editors stay agnostic
//! to where their value lives. Array writes clone the list, replace the one
//! field of the one row, and patch the whole list back; sibling rows are
//! carried over unchanged.

use crate::block::PropertyBag;
use crate::document::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyPath {
    /// `props.key`
    Key { key: String },

    /// `props.list[item].field`
    ItemField {
        list: String,
        item: usize,
        field: String,
    },

    /// `props.list[item].field[entry]`
    ItemEntry {
        list: String,
        item: usize,
        field: String,
        entry: usize,
    },
}

impl PropertyPath {
    pub fn key(key: &str) -> Self {
        PropertyPath::Key {
            key: key.to_string(),
        }
    }

    pub fn item_field(list: &str, item: usize, field: &str) -> Self {
        PropertyPath::ItemField {
            list: list.to_string(),
            item,
            field: field.to_string(),
        }
    }

    pub fn item_entry(list: &str, item: usize, field: &str, entry: usize) -> Self {
        PropertyPath::ItemEntry {
            list: list.to_string(),
            item,
            field: field.to_string(),
            entry,
        }
    }

    /// Top-level prop key the path lives under
    pub fn root_key(&self) -> &str {
        match self {
            PropertyPath::Key { key } => key,
            PropertyPath::ItemField { list, .. } | PropertyPath::ItemEntry { list, .. } => list,
        }
    }

    /// Current value at this path, if it exists
    pub fn resolve<'a>(&self, props: &'a PropertyBag) -> Option<&'a Value> {
        match self {
            PropertyPath::Key { key } => props.get(key),
            PropertyPath::ItemField { list, item, field } => {
                props.get(list)?.as_array()?.get(*item)?.get(field)
            }
            PropertyPath::ItemEntry {
                list,
                item,
                field,
                entry,
            } => props
                .get(list)?
                .as_array()?
                .get(*item)?
                .get(field)?
                .as_array()?
                .get(*entry),
        }
    }

    /// Compute the partial props that writes `value` at this path
    ///
    /// Returns `None` when the path does not point into the current props.
    fn partial_for(&self, props: &PropertyBag, value: Value) -> Option<PropertyBag> {
        let mut partial = PropertyBag::new();

        match self {
            PropertyPath::Key { key } => {
                partial.insert(key.clone(), value);
            }
            PropertyPath::ItemField { list, item, field } => {
                let mut rows = props.get(list)?.as_array()?.clone();
                let row = rows.get_mut(*item)?.as_object_mut()?;
                row.insert(field.clone(), value);
                partial.insert(list.clone(), Value::Array(rows));
            }
            PropertyPath::ItemEntry {
                list,
                item,
                field,
                entry,
            } => {
                let mut rows = props.get(list)?.as_array()?.clone();
                let row = rows.get_mut(*item)?.as_object_mut()?;
                let slot = row.get_mut(field)?.as_array_mut()?.get_mut(*entry)?;
                *slot = value;
                partial.insert(list.clone(), Value::Array(rows));
            }
        }

        Some(partial)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyPath::Key { key } => write!(f, "{}", key),
            PropertyPath::ItemField { list, item, field } => {
                write!(f, "{}[{}].{}", list, item, field)
            }
            PropertyPath::ItemEntry {
                list,
                item,
                field,
                entry,
            } => write!(f, "{}[{}].{}[{}]", list, item, field, entry),
        }
    }
}

impl Document {
    /// Write `value` at `path` inside the props of the block at `index`
    ///
    /// Stale indices and paths that no longer exist are no-ops.
    pub fn set_path(&self, index: usize, path: &PropertyPath, value: Value) -> Document {
        let Some(block) = self.get(index) else {
            debug!(index, path = %path, "Ignoring write to stale block index");
            return self.clone();
        };

        match path.partial_for(block.props(), value) {
            Some(partial) => self.patch_props(index, &partial),
            None => {
                debug!(index, path = %path, "Ignoring write to missing path");
                self.clone()
            }
        }
    }

    /// Read the value at `path` in the block at `index`
    pub fn value_at(&self, index: usize, path: &PropertyPath) -> Option<&Value> {
        path.resolve(self.get(index)?.props())
    }
}
