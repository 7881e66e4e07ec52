//! # Block Mutations
//!
//! Semantic operations on a page document.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation is one user gesture
//! 2. **Pure**: applying returns a new document, the input is untouched
//! 3. **Index tolerant**: stale indices are no-ops, never errors
//!
//! ## Mutation Semantics
//!
//! ### AddBlock / InsertBlock
//! - New block gets a fresh uid and the registry's default props
//! - Insert index is clamped to `[0, len]`
//! - Fails only for an unregistered block type
//!
//! ### MoveBlock
//! - List-move: take out at `from`, reinsert at `to`
//! - No-op if `from == to` or either is out of range
//!
//! ### PatchProps
//! - Shallow merge, nested values replaced wholesale
//!
//! ### SetPath
//! - Writes one value at a property path, preserving sibling rows

use pagecraft_model::{Document, PropertyBag, PropertyPath, Registry, RegistryError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Append a new block
    AddBlock { block_type: String },

    /// Insert a new block at index (clamped)
    InsertBlock { block_type: String, index: i64 },

    /// Remove the block at index
    RemoveBlock { index: usize },

    /// Move a block to a new position
    MoveBlock { from: usize, to: usize },

    /// Shallow-merge props into a block
    PatchProps { index: usize, props: PropertyBag },

    /// Write one value at a property path
    SetPath {
        index: usize,
        path: PropertyPath,
        value: Value,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl Mutation {
    /// Apply mutation to a document, producing the next document
    pub fn apply(&self, doc: &Document, registry: &Registry) -> Result<Document, MutationError> {
        self.validate(registry)?;

        let next = match self {
            Mutation::AddBlock { block_type } => doc.add(registry, block_type)?,
            Mutation::InsertBlock { block_type, index } => {
                doc.insert_at(registry, block_type, *index)?
            }
            Mutation::RemoveBlock { index } => doc.remove(*index),
            Mutation::MoveBlock { from, to } => doc.move_block(*from, *to),
            Mutation::PatchProps { index, props } => doc.patch_props(*index, props),
            Mutation::SetPath { index, path, value } => doc.set_path(*index, path, value.clone()),
        };

        Ok(next)
    }

    /// Validate without applying
    ///
    /// Only block creation can fail; everything else degrades to a no-op.
    pub fn validate(&self, registry: &Registry) -> Result<(), MutationError> {
        match self {
            Mutation::AddBlock { block_type } | Mutation::InsertBlock { block_type, .. } => {
                registry.describe(block_type)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddBlock { .. } => "add_block",
            Mutation::InsertBlock { .. } => "insert_block",
            Mutation::RemoveBlock { .. } => "remove_block",
            Mutation::MoveBlock { .. } => "move_block",
            Mutation::PatchProps { .. } => "patch_props",
            Mutation::SetPath { .. } => "set_path",
        }
    }

    /// Human readable label, used for undo history
    pub fn describe(&self) -> String {
        match self {
            Mutation::AddBlock { block_type } => format!("Add {}", block_type),
            Mutation::InsertBlock { block_type, index } => {
                format!("Insert {} at {}", block_type, index)
            }
            Mutation::RemoveBlock { index } => format!("Remove block {}", index),
            Mutation::MoveBlock { from, to } => format!("Move block {} to {}", from, to),
            Mutation::PatchProps { index, .. } => format!("Edit block {}", index),
            Mutation::SetPath { index, path, .. } => format!("Edit {} of block {}", path, index),
        }
    }
}
