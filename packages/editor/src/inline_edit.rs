//! # Inline Editing
//!
//! Leaf text editors embedded in the live preview. An [`InlineEditor`] only
//! knows the value it is bound to; where that value lives in the document is
//! the caller's business, expressed as a block uid and a [`PropertyPath`]
//! when the session writes the commit back.
//!
//! Keystrokes only touch the local draft. Nothing is validated while typing
//! and nothing is written until the editor loses focus.

use pagecraft_model::{Document, PropertyPath};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    SingleLine,
    Multiline,
}

/// Keys the editor reacts to; everything else is text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Key left to the text field, which reports the result through `input`
    PassThrough,

    /// Key ended editing; carries the commit, if the value changed
    Committed(Option<String>),
}

#[derive(Debug, Clone, Default)]
pub struct InlineEditor {
    mode: EditMode,
    bound: String,
    draft: String,
    focused: bool,

    /// Draft differs from what focus or the last sync put there
    edited: bool,
}

impl InlineEditor {
    pub fn new(mode: EditMode, bound: impl Into<String>) -> Self {
        let bound = bound.into();
        Self {
            mode,
            draft: bound.clone(),
            bound,
            focused: false,
            edited: false,
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Text currently shown
    pub fn display(&self) -> &str {
        if self.focused {
            &self.draft
        } else {
            &self.bound
        }
    }

    /// Bound value changed outside the editor
    ///
    /// The displayed text follows it unless the user has typed since
    /// focusing; a typed draft is kept and the new value becomes its baseline.
    pub fn sync(&mut self, bound: &str) {
        if self.bound == bound {
            return;
        }
        self.bound = bound.to_string();
        if !self.edited {
            self.draft = self.bound.clone();
        }
    }

    pub fn focus(&mut self) {
        if !self.focused {
            self.focused = true;
            self.edited = false;
            self.draft = self.bound.clone();
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Replace the draft with the field's current text
    pub fn input(&mut self, text: &str) {
        if self.focused {
            self.draft = text.to_string();
            self.edited = true;
        }
    }

    pub fn key_down(&mut self, key: EditKey) -> KeyOutcome {
        match (key, self.mode) {
            (EditKey::Enter, EditMode::SingleLine) => KeyOutcome::Committed(self.blur()),
            (EditKey::Enter, EditMode::Multiline) => KeyOutcome::PassThrough,
            (EditKey::Escape, _) => {
                self.focused = false;
                self.edited = false;
                self.draft = self.bound.clone();
                KeyOutcome::Committed(None)
            }
            (EditKey::Other, _) => KeyOutcome::PassThrough,
        }
    }

    /// Lose focus, committing the trimmed draft
    ///
    /// Returns `None` when the editor was not focused or the trimmed draft
    /// equals the bound value. An empty string is a valid commit.
    pub fn blur(&mut self) -> Option<String> {
        if !self.focused {
            return None;
        }
        self.focused = false;
        self.edited = false;

        let committed = self.draft.trim().to_string();
        if committed == self.bound {
            self.draft = self.bound.clone();
            return None;
        }

        debug!(len = committed.len(), "Inline edit committed");
        self.bound = committed.clone();
        self.draft = committed.clone();
        Some(committed)
    }
}

/// Text an editor bound to `path` should display
///
/// Non-string scalars are rendered with their JSON text; missing values and
/// nulls display as empty.
pub fn bound_text(document: &Document, index: usize, path: &PropertyPath) -> String {
    match document.value_at(index, path) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
