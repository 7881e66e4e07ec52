//! # Block Document
//!
//! The ordered sequence of blocks composing one page.
//!
//! Every operation takes `&self` and returns a new `Document`, so a render
//! pass can diff old against new state. Blocks are shared through `Arc`:
//! a block the operation did not touch is pointer-identical in the result.
//!
//! ## Index semantics
//!
//! Indices come from UI callbacks that may race with state updates, so
//! out-of-range indices are no-ops rather than errors. `insert_at` clamps
//! its index to `[0, len]` instead.

use crate::block::{Block, BlockRecord, PropertyBag};
use crate::error::{ModelError, RegistryError};
use crate::ids::{BlockId, IdGenerator};
use crate::registry::Registry;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Ordered blocks of one page
#[derive(Debug, Clone)]
pub struct Document {
    blocks: Vec<Arc<Block>>,
    ids: IdGenerator,
}

impl Document {
    /// Empty document for a page
    pub fn new(page_key: &str) -> Self {
        Self {
            blocks: Vec::new(),
            ids: IdGenerator::new(page_key),
        }
    }

    /// Build a document from backend records
    ///
    /// Records without a uid, or whose uid repeats an earlier record, get a
    /// fresh one.
    pub fn from_records(page_key: &str, records: Vec<BlockRecord>) -> Self {
        let mut doc = Self::new(page_key);
        let mut seen: HashSet<BlockId> = HashSet::new();

        // Reserve every supplied uid first so fresh ids cannot collide
        // with a record further down the list.
        let supplied: HashSet<BlockId> = records
            .iter()
            .filter_map(|r| r.uid.as_deref())
            .map(BlockId::from)
            .collect();

        for record in records {
            let uid = match record.uid.as_deref().map(BlockId::from) {
                Some(uid) if !seen.contains(&uid) => uid,
                existing => {
                    if let Some(dup) = existing {
                        debug!(uid = %dup, "Duplicate block uid, assigning a fresh one");
                    }
                    doc.fresh_uid_avoiding(&supplied, &seen)
                }
            };

            seen.insert(uid.clone());
            doc.blocks
                .push(Arc::new(Block::new(uid, record.block_type, record.props)));
        }

        doc
    }

    /// Parse a JSON array of block records
    pub fn from_json(page_key: &str, json: &str) -> Result<Self, ModelError> {
        let records: Vec<BlockRecord> = serde_json::from_str(json)?;

        if let Some(pos) = records.iter().position(|r| r.block_type.is_empty()) {
            return Err(ModelError::InvalidPage(format!(
                "record {} has an empty type",
                pos
            )));
        }

        Ok(Self::from_records(page_key, records))
    }

    /// Records for saving back to the backend, in display order
    pub fn to_records(&self) -> Vec<BlockRecord> {
        self.blocks.iter().map(|b| BlockRecord::from(b.as_ref())).collect()
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(&self.to_records())?)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index).map(Arc::as_ref)
    }

    /// Find a block by uid
    pub fn block(&self, uid: &BlockId) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|b| b.uid() == uid)
            .map(Arc::as_ref)
    }

    /// Current position of a block
    pub fn index_of(&self, uid: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.uid() == uid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().map(Arc::as_ref)
    }

    /// Shared block handles, for pointer-identity checks
    pub fn blocks(&self) -> &[Arc<Block>] {
        &self.blocks
    }

    pub fn uids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|b| b.uid().clone()).collect()
    }

    /// Append a new block with the registry's default props
    pub fn add(&self, registry: &Registry, block_type: &str) -> Result<Document, RegistryError> {
        self.insert_at(registry, block_type, self.blocks.len() as i64)
    }

    /// Insert a new block at `index`, clamped to `[0, len]`
    pub fn insert_at(
        &self,
        registry: &Registry,
        block_type: &str,
        index: i64,
    ) -> Result<Document, RegistryError> {
        let props = registry.defaults_for(block_type)?;

        let mut next = self.clone();
        let uid = next.fresh_uid();
        let at = index.clamp(0, self.blocks.len() as i64) as usize;

        debug!(block_type = %block_type, uid = %uid, index = at, "Inserting block");
        next.blocks
            .insert(at, Arc::new(Block::new(uid, block_type, props)));

        Ok(next)
    }

    /// Remove the block at `index`
    pub fn remove(&self, index: usize) -> Document {
        if index >= self.blocks.len() {
            debug!(index, len = self.blocks.len(), "Ignoring remove of stale index");
            return self.clone();
        }

        let mut next = self.clone();
        next.blocks.remove(index);
        next
    }

    /// Move the block at `from` so it ends up at `to`
    ///
    /// List-move semantics: the block is taken out, then reinserted at `to`
    /// in the shortened list.
    pub fn move_block(&self, from: usize, to: usize) -> Document {
        let len = self.blocks.len();
        if from == to || from >= len || to >= len {
            if from != to {
                debug!(from, to, len, "Ignoring move of stale index");
            }
            return self.clone();
        }

        let mut next = self.clone();
        let block = next.blocks.remove(from);
        next.blocks.insert(to, block);
        next
    }

    /// Shallow-merge `partial` into the props of the block at `index`
    pub fn patch_props(&self, index: usize, partial: &PropertyBag) -> Document {
        let Some(block) = self.blocks.get(index) else {
            debug!(index, len = self.blocks.len(), "Ignoring patch of stale index");
            return self.clone();
        };

        let mut next = self.clone();
        next.blocks[index] = Arc::new(block.merged(partial));
        next
    }

    /// True when both documents hold the very same block handles in order
    ///
    /// Cheaper than `==` and what "nothing changed" means after an
    /// operation turned out to be a no-op.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }

    /// Blocks of `snapshot`, keeping whichever id counter is further ahead
    ///
    /// Used when stepping through history so uids issued after the
    /// snapshot was taken are never handed out a second time.
    pub fn restore(&self, snapshot: &Document) -> Document {
        let ids = if self.ids.count() >= snapshot.ids.count() {
            self.ids.clone()
        } else {
            snapshot.ids.clone()
        };

        Document {
            blocks: snapshot.blocks.clone(),
            ids,
        }
    }

    fn fresh_uid(&mut self) -> BlockId {
        loop {
            let uid = self.ids.next_id();
            if self.index_of(&uid).is_none() {
                return uid;
            }
        }
    }

    fn fresh_uid_avoiding(
        &mut self,
        supplied: &HashSet<BlockId>,
        seen: &HashSet<BlockId>,
    ) -> BlockId {
        loop {
            let uid = self.ids.next_id();
            if !supplied.contains(&uid) && !seen.contains(&uid) {
                return uid;
            }
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
    }
}
