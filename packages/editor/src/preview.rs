//! # Preview Pipeline
//!
//! Keeps a rendered preview in step with the document: Mutate → Diff → Patch.
//!
//! The preview is a derived view. It never feeds back into the document;
//! after every change it is re-derived by diffing the last rendered block
//! list against the current one, keyed by block uid.
//!
//! ## Patch order
//!
//! [`diff_documents`] emits patches in the order [`apply_patches`] expects:
//!
//! 1. `Remove` for every block gone from the new document
//! 2. `Insert` and `Move` in ascending target index; moved blocks are
//!    detached first, then placed
//! 3. `Update` for surviving blocks whose content changed
//!
//! Blocks that keep their relative order (the longest increasing run of old
//! positions) stay put, so moving one block yields one `Move`.

use pagecraft_model::{Block, BlockId, Document};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewPatch {
    Remove { uid: BlockId },
    Insert { index: usize, block: Arc<Block> },
    Move { uid: BlockId, index: usize },
    Update { block: Arc<Block> },
}

/// Patches turning the rendering of `old` into that of `new`
pub fn diff_documents(old: &[Arc<Block>], new: &[Arc<Block>]) -> Vec<PreviewPatch> {
    let mut patches = Vec::new();

    let new_uids: HashSet<&BlockId> = new.iter().map(|b| b.uid()).collect();
    let old_index: HashMap<&BlockId, usize> = old
        .iter()
        .enumerate()
        .map(|(i, b)| (b.uid(), i))
        .collect();

    for block in old {
        if !new_uids.contains(block.uid()) {
            patches.push(PreviewPatch::Remove {
                uid: block.uid().clone(),
            });
        }
    }

    // Old positions of surviving blocks, in new order
    let survivors: Vec<(usize, usize)> = new
        .iter()
        .enumerate()
        .filter_map(|(new_i, b)| old_index.get(b.uid()).map(|&old_i| (new_i, old_i)))
        .collect();
    let positions: Vec<usize> = survivors.iter().map(|&(_, old_i)| old_i).collect();
    let stable: HashSet<usize> = longest_increasing_run(&positions)
        .into_iter()
        .map(|k| survivors[k].0)
        .collect();

    for (index, block) in new.iter().enumerate() {
        match old_index.get(block.uid()) {
            None => patches.push(PreviewPatch::Insert {
                index,
                block: Arc::clone(block),
            }),
            Some(_) if !stable.contains(&index) => patches.push(PreviewPatch::Move {
                uid: block.uid().clone(),
                index,
            }),
            Some(_) => {}
        }
    }

    for block in new {
        if let Some(&old_i) = old_index.get(block.uid()) {
            let before = &old[old_i];
            if !Arc::ptr_eq(before, block) && before != block {
                patches.push(PreviewPatch::Update {
                    block: Arc::clone(block),
                });
            }
        }
    }

    patches
}

/// Apply patches produced by [`diff_documents`] to a rendered block list
pub fn apply_patches(rendered: &mut Vec<Arc<Block>>, patches: &[PreviewPatch]) {
    let mut detached: HashMap<BlockId, Arc<Block>> = HashMap::new();

    let removed: HashSet<&BlockId> = patches
        .iter()
        .filter_map(|p| match p {
            PreviewPatch::Remove { uid } => Some(uid),
            _ => None,
        })
        .collect();
    let moved: HashSet<&BlockId> = patches
        .iter()
        .filter_map(|p| match p {
            PreviewPatch::Move { uid, .. } => Some(uid),
            _ => None,
        })
        .collect();

    rendered.retain(|block| {
        if moved.contains(block.uid()) {
            detached.insert(block.uid().clone(), Arc::clone(block));
            return false;
        }
        !removed.contains(block.uid())
    });

    for patch in patches {
        match patch {
            PreviewPatch::Remove { .. } => {}
            PreviewPatch::Insert { index, block } => {
                let at = (*index).min(rendered.len());
                rendered.insert(at, Arc::clone(block));
            }
            PreviewPatch::Move { uid, index } => {
                if let Some(block) = detached.remove(uid) {
                    let at = (*index).min(rendered.len());
                    rendered.insert(at, block);
                }
            }
            PreviewPatch::Update { block } => {
                if let Some(slot) = rendered.iter_mut().find(|b| b.uid() == block.uid()) {
                    *slot = Arc::clone(block);
                }
            }
        }
    }
}

/// Indices into `seq` of one longest strictly increasing subsequence
fn longest_increasing_run(seq: &[usize]) -> Vec<usize> {
    // tails[k]: index into seq of the smallest tail of a run of length k+1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (i, &value) in seq.iter().enumerate() {
        let k = tails.partition_point(|&t| seq[t] < value);
        if k > 0 {
            prev[i] = Some(tails[k - 1]);
        }
        if k == tails.len() {
            tails.push(i);
        } else {
            tails[k] = i;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        run.push(i);
        cursor = prev[i];
    }
    run.reverse();
    run
}

/// Modal live preview of a document
///
/// While open, every [`Preview::refresh`] returns only the patches needed
/// since the last render. Closing drops the cached rendering.
#[derive(Debug, Default)]
pub struct Preview {
    rendered: Option<Vec<Arc<Block>>>,
}

impl Preview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the preview with a full render
    pub fn open(&mut self, document: &Document) -> &[Arc<Block>] {
        self.rendered.insert(document.blocks().to_vec())
    }

    pub fn close(&mut self) {
        self.rendered = None;
    }

    pub fn is_open(&self) -> bool {
        self.rendered.is_some()
    }

    /// Bring the preview up to date; empty when closed or unchanged
    pub fn refresh(&mut self, document: &Document) -> Vec<PreviewPatch> {
        let Some(rendered) = &mut self.rendered else {
            return Vec::new();
        };

        let patches = diff_documents(rendered, document.blocks());
        if !patches.is_empty() {
            debug!(patches = patches.len(), "Preview refreshed");
            apply_patches(rendered, &patches);
        }
        patches
    }

    /// Blocks as currently rendered
    pub fn rendered(&self) -> Option<&[Arc<Block>]> {
        self.rendered.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::{bag, Registry};
    use serde_json::json;

    fn doc_of(types: &[&str]) -> Document {
        let registry = Registry::builtin();
        types.iter().fold(Document::new("preview"), |doc, ty| {
            doc.add(&registry, ty).unwrap()
        })
    }

    fn replay(old: &Document, new: &Document) -> Vec<PreviewPatch> {
        let patches = diff_documents(old.blocks(), new.blocks());
        let mut rendered = old.blocks().to_vec();
        apply_patches(&mut rendered, &patches);

        let rendered_uids: Vec<_> = rendered.iter().map(|b| b.uid().clone()).collect();
        assert_eq!(rendered_uids, new.uids());
        assert_eq!(rendered.as_slice(), new.blocks());
        patches
    }

    #[test]
    fn test_identical_documents_produce_nothing() {
        let doc = doc_of(&["hero", "text"]);
        assert!(diff_documents(doc.blocks(), doc.blocks()).is_empty());
    }

    #[test]
    fn test_single_move_is_one_patch() {
        let doc = doc_of(&["hero", "text", "faq", "cta"]);

        let patches = replay(&doc, &doc.move_block(0, 3));
        assert_eq!(patches.len(), 1);
        assert!(matches!(patches[0], PreviewPatch::Move { index: 3, .. }));

        let patches = replay(&doc, &doc.move_block(3, 0));
        assert_eq!(patches.len(), 1);
    }

    #[test]
    fn test_insert_and_remove() {
        let registry = Registry::builtin();
        let doc = doc_of(&["hero", "text", "faq"]);
        let next = doc.remove(1).insert_at(&registry, "gallery", 0).unwrap();

        let patches = replay(&doc, &next);
        assert!(matches!(patches[0], PreviewPatch::Remove { .. }));
        assert!(matches!(patches[1], PreviewPatch::Insert { index: 0, .. }));
        assert_eq!(patches.len(), 2);
    }

    #[test]
    fn test_only_touched_block_updates() {
        let doc = doc_of(&["hero", "text", "faq"]);
        let next = doc.patch_props(1, &bag(json!({ "body": "Changed" })));

        let patches = replay(&doc, &next);
        assert_eq!(patches.len(), 1);
        match &patches[0] {
            PreviewPatch::Update { block } => assert_eq!(block.uid(), &doc.uids()[1]),
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_reverse_and_mixed_changes_replay() {
        let registry = Registry::builtin();
        let doc = doc_of(&["hero", "text", "faq", "jobs", "cta"]);

        let reversed = doc
            .move_block(4, 0)
            .move_block(4, 1)
            .move_block(4, 2)
            .move_block(4, 3);
        replay(&doc, &reversed);

        let mixed = doc
            .remove(2)
            .move_block(0, 2)
            .insert_at(&registry, "contact", 1)
            .unwrap()
            .patch_props(0, &bag(json!({ "body": "x" })));
        replay(&doc, &mixed);
    }

    #[test]
    fn test_longest_increasing_run() {
        assert_eq!(longest_increasing_run(&[]), Vec::<usize>::new());
        assert_eq!(longest_increasing_run(&[0, 1, 2]), vec![0, 1, 2]);
        assert_eq!(longest_increasing_run(&[3, 0, 1, 2]).len(), 3);
        assert_eq!(longest_increasing_run(&[2, 1, 0]).len(), 1);
    }

    #[test]
    fn test_preview_lifecycle() {
        let doc = doc_of(&["hero"]);
        let mut preview = Preview::new();

        // Closed preview ignores refreshes
        assert!(preview.refresh(&doc).is_empty());
        assert!(!preview.is_open());

        assert_eq!(preview.open(&doc).len(), 1);
        let registry = Registry::builtin();
        let next = doc.add(&registry, "cta").unwrap();

        let patches = preview.refresh(&next);
        assert_eq!(patches.len(), 1);
        assert_eq!(preview.rendered().unwrap(), next.blocks());
        assert!(preview.refresh(&next).is_empty());

        preview.close();
        assert!(preview.rendered().is_none());
    }
}
