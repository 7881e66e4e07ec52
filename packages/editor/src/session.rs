//! # Edit Session Management
//!
//! An EditSession is the single writer of one page. Every gesture (palette
//! drop, handle drag, inline commit, upload completion) ends up here as a
//! [`Mutation`] applied synchronously to the current document, recorded for
//! undo, and followed by the bookkeeping that keeps derived state honest:
//! cached list identities and pending uploads of removed blocks are dropped.

use crate::drag::{DragData, PaletteDrag, ReorderDrag};
use crate::inline_edit::InlineEditor;
use crate::preview::{Preview, PreviewPatch};
use crate::uploads::{Notification, UploadTicket, UploadTracker};
use crate::{EditorError, Mutation, UndoStack};
use pagecraft_model::{Block, BlockId, Document, Identified, ListIdentities, PropertyPath, Registry};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    registry: Registry,
    document: Document,
    undo: UndoStack,
    lists: ListIdentities,
    uploads: UploadTracker,
    notifications: Vec<Notification>,
    reorder: ReorderDrag,
    palette: PaletteDrag,
    preview: Preview,

    /// Incremented on every change, including undo and redo
    version: u64,

    /// Document as last saved or loaded
    saved: Document,

    /// Backing file, if loaded from disk
    path: Option<PathBuf>,
}

impl EditSession {
    pub fn new(id: impl Into<String>, registry: Registry, document: Document) -> Self {
        Self {
            id: id.into(),
            registry,
            saved: document.clone(),
            document,
            undo: UndoStack::new(),
            lists: ListIdentities::new(),
            uploads: UploadTracker::new(),
            notifications: Vec::new(),
            reorder: ReorderDrag::default(),
            palette: PaletteDrag::new(),
            preview: Preview::new(),
            version: 0,
            path: None,
        }
    }

    /// Load a page file; the page key is the file stem
    pub fn load(path: impl AsRef<Path>, registry: Registry) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let page_key = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("page")
            .to_string();

        Self::load_with_key(path, &page_key, registry)
    }

    /// Load a page file, seeding new uids from `page_key`
    pub fn load_with_key(
        path: impl AsRef<Path>,
        page_key: &str,
        registry: Registry,
    ) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;

        let document = Document::from_json(page_key, &source)?;
        info!(path = %path.display(), blocks = document.len(), "Loaded page");

        let mut session = Self::new(page_key, registry, document);
        session.path = Some(path.to_path_buf());
        Ok(session)
    }

    pub fn with_undo_levels(mut self, levels: usize) -> Self {
        self.undo = UndoStack::with_max_levels(levels);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the document differs from the saved one
    ///
    /// Undoing back to the saved state makes the session clean again.
    pub fn is_dirty(&self) -> bool {
        !self.document.ptr_eq(&self.saved)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply a mutation; returns whether the document changed
    pub fn apply(&mut self, mutation: Mutation) -> Result<bool, EditorError> {
        let changed = self
            .undo
            .apply(&mutation, &mut self.document, &self.registry)?;

        if changed {
            debug!(session = %self.id, op = mutation.name(), "Applied mutation");
            self.after_change();
        }
        Ok(changed)
    }

    /// Apply several mutations as one undo step
    ///
    /// Stops at the first failing mutation; what was applied before it
    /// stays applied and undoable.
    pub fn apply_all(
        &mut self,
        mutations: impl IntoIterator<Item = Mutation>,
        description: &str,
    ) -> Result<usize, EditorError> {
        self.undo.begin_batch(&self.document);
        self.undo.set_batch_description(description);

        let mut changed = 0;
        let mut result = Ok(());
        for mutation in mutations {
            match self.apply(mutation) {
                Ok(true) => changed += 1,
                Ok(false) => {}
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        self.undo.end_batch();
        result.map(|_| changed)
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.undo.undo(&mut self.document);
        if undone {
            self.after_change();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.undo.redo(&mut self.document);
        if redone {
            self.after_change();
        }
        redone
    }

    /// Pointer-sensor reorder state
    pub fn reorder(&mut self) -> &mut ReorderDrag {
        &mut self.reorder
    }

    /// Release the reorder drag, moving the block if it landed elsewhere
    pub fn end_reorder(&mut self) -> Result<bool, EditorError> {
        match self.reorder.pointer_up(&self.document) {
            Some(mutation) => self.apply(mutation),
            None => Ok(false),
        }
    }

    /// Palette insert drag state
    pub fn palette(&mut self) -> &mut PaletteDrag {
        &mut self.palette
    }

    /// Drop a palette drag onto the canvas
    pub fn drop_palette(&mut self, data: &DragData) -> Result<bool, EditorError> {
        match self.palette.drop(data, &self.document) {
            Some(mutation) => self.apply(mutation),
            None => Ok(false),
        }
    }

    /// Write an inline editor's committed text back into block `uid`
    ///
    /// The text is trimmed. Unchanged text and blocks that no longer exist
    /// are no-ops.
    pub fn commit_inline(
        &mut self,
        uid: &BlockId,
        path: PropertyPath,
        text: &str,
    ) -> Result<bool, EditorError> {
        let Some(index) = self.document.index_of(uid) else {
            debug!(uid = %uid, "Inline commit for a removed block");
            return Ok(false);
        };

        let value = Value::String(text.trim().to_string());
        if self.document.value_at(index, &path) == Some(&value) {
            return Ok(false);
        }

        self.apply(Mutation::SetPath { index, path, value })
    }

    /// Blur `editor` and write its draft back into block `uid`
    pub fn commit_editor(
        &mut self,
        uid: &BlockId,
        path: PropertyPath,
        editor: &mut InlineEditor,
    ) -> Result<bool, EditorError> {
        match editor.blur() {
            Some(text) => self.commit_inline(uid, path, &text),
            None => Ok(false),
        }
    }

    /// Rows of a nested list with stable identities
    pub fn list_rows(&mut self, uid: &BlockId, key: &str) -> Vec<Identified<Value>> {
        match self.document.block(uid) {
            Some(block) => self.lists.rows(&self.registry, block, key),
            None => Vec::new(),
        }
    }

    pub fn begin_upload(&mut self, uid: BlockId, path: PropertyPath) -> UploadTicket {
        self.uploads.begin(uid, path)
    }

    /// Resolve an upload with the stored file's URL or an error message
    ///
    /// Failures queue a notification and leave the document alone. Returns
    /// whether the document changed.
    pub fn finish_upload(
        &mut self,
        ticket: &UploadTicket,
        outcome: Result<String, String>,
    ) -> Result<bool, EditorError> {
        if !self.uploads.settle(ticket) {
            return Ok(false);
        }

        match outcome {
            Ok(url) => {
                let Some(index) = self.document.index_of(&ticket.uid) else {
                    return Ok(false);
                };
                self.apply(Mutation::SetPath {
                    index,
                    path: ticket.path.clone(),
                    value: Value::String(url),
                })
            }
            Err(message) => {
                debug!(uid = %ticket.uid, path = %ticket.path, "Upload failed");
                self.notifications
                    .push(Notification::new(format!("Upload failed: {}", message)));
                Ok(false)
            }
        }
    }

    /// Drain queued notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Replace the document with the backend's copy
    ///
    /// History is cleared. Nested-list identities are kept so rows that
    /// survived the round trip keep their identity.
    pub fn reload(&mut self, document: Document) {
        self.document = document;
        self.undo.clear();
        self.palette.drag_end();
        self.reorder.cancel();
        self.after_change();
        self.saved = self.document.clone();
    }

    pub fn open_preview(&mut self) -> Vec<Arc<Block>> {
        self.preview.open(&self.document).to_vec()
    }

    pub fn refresh_preview(&mut self) -> Vec<PreviewPatch> {
        self.preview.refresh(&self.document)
    }

    pub fn close_preview(&mut self) {
        self.preview.close();
    }

    /// Save to the backing file
    pub fn save(&mut self) -> Result<(), EditorError> {
        let path = self.path.clone().ok_or(EditorError::NotFileBacked)?;
        self.save_as(path)
    }

    /// Save to `path`, which becomes the backing file
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), EditorError> {
        let path = path.into();
        let json = self.document.to_json()?;
        std::fs::write(&path, json)?;

        info!(path = %path.display(), version = self.version, "Saved page");
        self.path = Some(path);
        self.saved = self.document.clone();
        Ok(())
    }

    fn after_change(&mut self) {
        self.version += 1;
        self.lists.retain_blocks(&self.document);

        let document = &self.document;
        self.uploads.retain(|uid| document.index_of(uid).is_some());
    }
}
