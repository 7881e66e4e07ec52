//! # Undo/Redo Stack
//!
//! Tracks document history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Documents are values with shared blocks, so history stores snapshots
//!   rather than inverse mutations
//! - Undo restores the snapshot taken before a batch, redo the one after
//! - New mutations clear the redo stack
//! - Supports batched operations (group multiple mutations as one undo step)
//! - Mutations that change nothing are not recorded
//!
//! ## Example
//!
//! ```rust
//! use pagecraft_editor::{Mutation, UndoStack};
//! use pagecraft_model::{Document, Registry};
//!
//! let registry = Registry::builtin();
//! let mut doc = Document::new("home");
//! let mut stack = UndoStack::new();
//!
//! let mutation = Mutation::AddBlock { block_type: "hero".to_string() };
//! stack.apply(&mutation, &mut doc, &registry)?;
//! assert_eq!(doc.len(), 1);
//!
//! stack.undo(&mut doc);
//! assert!(doc.is_empty());
//!
//! stack.redo(&mut doc);
//! assert_eq!(doc.len(), 1);
//! # Ok::<(), pagecraft_editor::MutationError>(())
//! ```

use crate::{Mutation, MutationError};
use pagecraft_model::{Document, Registry};

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// Document before the first mutation
    pub before: Document,

    /// Document after the last mutation
    pub after: Document,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    /// Create a single-mutation batch
    pub fn single(mutation: Mutation, before: Document, after: Document) -> Self {
        let description = Some(mutation.describe());
        Self {
            mutations: vec![mutation],
            before,
            after,
            description,
        }
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo
    ///
    /// Returns whether the document changed.
    pub fn apply(
        &mut self,
        mutation: &Mutation,
        doc: &mut Document,
        registry: &Registry,
    ) -> Result<bool, MutationError> {
        let next = mutation.apply(doc, registry)?;
        if next.ptr_eq(doc) {
            return Ok(false);
        }

        let before = std::mem::replace(doc, next);
        self.record(mutation.clone(), before, doc.clone());
        Ok(true)
    }

    /// Record an already-applied transition
    pub fn record(&mut self, mutation: Mutation, before: Document, after: Document) {
        if let Some(batch) = &mut self.current_batch {
            if batch.mutations.is_empty() {
                batch.before = before;
            }
            batch.mutations.push(mutation);
            batch.after = after;
        } else {
            self.push_batch(MutationBatch::single(mutation, before, after));
        }
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self, doc: &Document) {
        self.current_batch = Some(MutationBatch {
            mutations: Vec::new(),
            before: doc.clone(),
            after: doc.clone(),
            description: None,
        });
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    /// Push a batch to the undo stack
    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // Clear redo stack (new action invalidates future)
        self.redo_stack.clear();
    }

    /// Undo the most recent batch
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        match self.undo_stack.pop() {
            Some(batch) => {
                *doc = doc.restore(&batch.before);
                self.redo_stack.push(batch);
                true
            }
            None => false, // Nothing to undo
        }
    }

    /// Redo the most recently undone batch
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        match self.redo_stack.pop() {
            Some(batch) => {
                *doc = doc.restore(&batch.after);
                self.undo_stack.push(batch);
                true
            }
            None => false, // Nothing to redo
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
