//! # Pagecraft Editor
//!
//! Live-editing engine for Pagecraft pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: registry, blocks, document, sync     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: gestures → mutations → document     │
//! │  - Palette and reorder drags                │
//! │  - Inline edits committed on blur           │
//! │  - Uploads settled by ticket                │
//! │  - Undo/redo over document snapshots        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ preview: document → patches by block uid    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: the preview is a derived view
//! 2. **Single writer**: the [`EditSession`] applies every mutation
//! 3. **Uids, not indices**: in-flight gestures remember blocks by uid and
//!    resolve indices when they land
//!
//! ## Usage
//!
//! ```rust
//! use pagecraft_editor::{DragData, EditSession, Mutation};
//! use pagecraft_model::{Document, PropertyPath, Registry};
//!
//! let mut session = EditSession::new("client-1", Registry::builtin(), Document::new("home"));
//!
//! // Palette drop on an empty canvas appends
//! session.drop_palette(&DragData::for_block("faq"))?;
//!
//! // Inline edit of the first FAQ entry
//! let uid = session.document().uids()[0].clone();
//! session.commit_inline(&uid, PropertyPath::item_field("items", 0, "title"), "Parking?")?;
//!
//! session.undo();
//! assert_eq!(session.document().len(), 1);
//! # Ok::<(), pagecraft_editor::EditorError>(())
//! ```

mod drag;
mod errors;
mod inline_edit;
mod mutations;
mod panel;
mod preview;
mod session;
mod undo_stack;
mod uploads;

pub use drag::{
    closest_center, DragData, DropPosition, DropTarget, PaletteDrag, Point, Rect, ReorderDrag,
    BLOCK_TYPE_KEY, DEFAULT_ACTIVATION_DISTANCE,
};
pub use errors::EditorError;
pub use inline_edit::{bound_text, EditKey, EditMode, InlineEditor, KeyOutcome};
pub use mutations::{Mutation, MutationError};
pub use panel::{FloatingPanel, Viewport, MIN_PANEL_HEIGHT, MIN_PANEL_WIDTH};
pub use preview::{apply_patches, diff_documents, Preview, PreviewPatch};
pub use session::EditSession;
pub use undo_stack::{MutationBatch, UndoStack};
pub use uploads::{Notification, UploadTicket, UploadTracker};
