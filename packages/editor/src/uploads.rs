//! # Upload Tickets
//!
//! File uploads run outside the editor; only their outcome comes back. Each
//! upload started for a property gets a ticket. When several uploads race
//! for the same property, the most recently started one owns it: earlier
//! tickets resolving later are stale and get discarded.

use pagecraft_model::{BlockId, PropertyPath};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Handle for one in-flight upload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadTicket {
    pub id: u64,
    pub uid: BlockId,
    pub path: PropertyPath,
}

#[derive(Debug, Default)]
pub struct UploadTracker {
    next_id: u64,
    latest: HashMap<(BlockId, PropertyPath), u64>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an upload targeting `path` of block `uid`
    pub fn begin(&mut self, uid: BlockId, path: PropertyPath) -> UploadTicket {
        self.next_id += 1;
        let id = self.next_id;

        if let Some(previous) = self.latest.insert((uid.clone(), path.clone()), id) {
            debug!(uid = %uid, path = %path, superseded = previous, "Upload superseded");
        }

        UploadTicket { id, uid, path }
    }

    /// Settle a ticket; true if it still owns its property
    pub fn settle(&mut self, ticket: &UploadTicket) -> bool {
        let slot = (ticket.uid.clone(), ticket.path.clone());
        match self.latest.get(&slot) {
            Some(&id) if id == ticket.id => {
                self.latest.remove(&slot);
                true
            }
            _ => {
                debug!(ticket = ticket.id, uid = %ticket.uid, "Discarding stale upload");
                false
            }
        }
    }

    /// Forget uploads targeting blocks for which `keep` is false
    pub fn retain(&mut self, mut keep: impl FnMut(&BlockId) -> bool) {
        self.latest.retain(|(uid, _), _| keep(uid));
    }

    pub fn in_flight(&self) -> usize {
        self.latest.len()
    }
}

/// Transient message for the user, e.g. a failed upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
