//! # Drag-Reorder & Drop Targets
//!
//! Two separate drag protocols turn pointer and drag events into block
//! mutations:
//!
//! - [`ReorderDrag`]: a pointer-sensor drag of an existing block's handle.
//!   The block under the pointer is picked by closest center, and on
//!   release the move is resolved against the document as it is *then*.
//! - [`PaletteDrag`]: a block type dragged in from the palette over the
//!   native drag-data channel. Hovering a block computes a [`DropTarget`];
//!   dropping inserts there, or appends when no target is set.
//!
//! Both remember blocks by uid while the drag is in flight, never by index,
//! so a document that changed mid-drag cannot misroute the drop.

use crate::Mutation;
use pagecraft_model::{BlockId, Document};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Drag-data key carrying a palette block type
pub const BLOCK_TYPE_KEY: &str = "application/x-pagecraft-block";

/// Pointer travel before a press turns into a reorder drag
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Bounding box of a rendered block
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.mid_y())
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
}

impl DropPosition {
    /// Side of `rect` the pointer is on; the midpoint counts as `After`
    pub fn from_pointer(rect: &Rect, pointer_y: f64) -> Self {
        if pointer_y < rect.mid_y() {
            DropPosition::Before
        } else {
            DropPosition::After
        }
    }
}

/// Where a dragged block would land if dropped now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropTarget {
    pub index: usize,
    pub position: DropPosition,
}

impl DropTarget {
    /// Index a new block is inserted at
    pub fn insertion_index(&self) -> usize {
        match self.position {
            DropPosition::Before => self.index,
            DropPosition::After => self.index + 1,
        }
    }
}

/// Block whose center is nearest `pointer`
///
/// Ties go to the earlier entry in `layout`.
pub fn closest_center(pointer: Point, layout: &[(BlockId, Rect)]) -> Option<&BlockId> {
    let mut best: Option<(&BlockId, f64)> = None;

    for (uid, rect) in layout {
        let distance = pointer.distance_to(rect.center());
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((uid, distance)),
        }
    }

    best.map(|(uid, _)| uid)
}

#[derive(Debug, Clone, PartialEq)]
enum ReorderState {
    Idle,
    Pressed { active: BlockId, origin: Point },
    Dragging { active: BlockId, over: Option<BlockId> },
}

/// Pointer-sensor reorder of existing blocks
#[derive(Debug, Clone)]
pub struct ReorderDrag {
    activation_distance: f64,
    state: ReorderState,
}

impl ReorderDrag {
    pub fn new(activation_distance: f64) -> Self {
        Self {
            activation_distance,
            state: ReorderState::Idle,
        }
    }

    /// Pointer pressed on a block's drag handle
    pub fn pointer_down(&mut self, active: BlockId, at: Point) {
        self.state = ReorderState::Pressed { active, origin: at };
    }

    /// Pointer moved; returns the block currently targeted
    pub fn pointer_move(&mut self, at: Point, layout: &[(BlockId, Rect)]) -> Option<&BlockId> {
        if let ReorderState::Pressed { active, origin } = &self.state {
            if origin.distance_to(at) < self.activation_distance {
                return None;
            }
            debug!(uid = %active, "Reorder drag activated");
            self.state = ReorderState::Dragging {
                active: active.clone(),
                over: None,
            };
        }

        match &mut self.state {
            ReorderState::Dragging { over, .. } => {
                *over = closest_center(at, layout).cloned();
                over.as_ref()
            }
            _ => None,
        }
    }

    /// Pointer released; resolves the move against the current document
    pub fn pointer_up(&mut self, document: &Document) -> Option<Mutation> {
        let state = std::mem::replace(&mut self.state, ReorderState::Idle);

        let ReorderState::Dragging {
            active,
            over: Some(over),
        } = state
        else {
            return None;
        };

        let from = document.index_of(&active)?;
        let to = document.index_of(&over)?;

        if from == to {
            return None;
        }

        Some(Mutation::MoveBlock { from, to })
    }

    pub fn cancel(&mut self) {
        self.state = ReorderState::Idle;
    }

    /// Block being dragged, once the drag has activated
    pub fn active(&self) -> Option<&BlockId> {
        match &self.state {
            ReorderState::Dragging { active, .. } => Some(active),
            _ => None,
        }
    }

    pub fn over(&self) -> Option<&BlockId> {
        match &self.state {
            ReorderState::Dragging { over, .. } => over.as_ref(),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ReorderState::Dragging { .. })
    }
}

impl Default for ReorderDrag {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

/// Payload of a native drag operation, keyed by format
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragData {
    entries: BTreeMap<String, String>,
}

impl DragData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload published when a palette entry starts dragging
    pub fn for_block(block_type: &str) -> Self {
        let mut data = Self::new();
        data.set(BLOCK_TYPE_KEY, block_type);
        data
    }

    pub fn set(&mut self, format: &str, value: &str) {
        self.entries.insert(format.to_string(), value.to_string());
    }

    pub fn get(&self, format: &str) -> Option<&str> {
        self.entries.get(format).map(String::as_str)
    }

    /// Block type carried by this drag, if it is a palette drag at all
    pub fn block_type(&self) -> Option<&str> {
        self.get(BLOCK_TYPE_KEY).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Anchor {
    uid: BlockId,
    target: DropTarget,
}

/// Palette-to-canvas insert drag
#[derive(Debug, Clone, Default)]
pub struct PaletteDrag {
    anchor: Option<Anchor>,
}

impl PaletteDrag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drag moved over the rendered block `uid`
    ///
    /// Returns false (and leaves state alone) for drags that do not carry a
    /// block type, e.g. file drags.
    pub fn drag_over(
        &mut self,
        data: &DragData,
        document: &Document,
        uid: &BlockId,
        rect: &Rect,
        pointer: Point,
    ) -> bool {
        if data.block_type().is_none() {
            return false;
        }

        let Some(index) = document.index_of(uid) else {
            return false;
        };

        self.anchor = Some(Anchor {
            uid: uid.clone(),
            target: DropTarget {
                index,
                position: DropPosition::from_pointer(rect, pointer.y),
            },
        });
        true
    }

    /// Drag left an element; clears the marker once it leaves the container
    pub fn drag_leave(&mut self, container: &Rect, pointer: Point) {
        if !container.contains(pointer) {
            self.anchor = None;
        }
    }

    /// Current insertion marker
    pub fn target(&self) -> Option<DropTarget> {
        self.anchor.as_ref().map(|a| a.target)
    }

    /// Drop; the target is resolved against `document` as it is now
    pub fn drop(&mut self, data: &DragData, document: &Document) -> Option<Mutation> {
        let anchor = self.anchor.take();
        let block_type = data.block_type()?.to_string();

        let target = anchor.and_then(|anchor| {
            let index = document.index_of(&anchor.uid)?;
            Some(DropTarget {
                index,
                position: anchor.target.position,
            })
        });

        match target {
            Some(target) => Some(Mutation::InsertBlock {
                block_type,
                index: target.insertion_index() as i64,
            }),
            None => Some(Mutation::AddBlock { block_type }),
        }
    }

    /// Drag ended without a drop (escape, dropped outside)
    pub fn drag_end(&mut self) {
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::Registry;

    fn doc() -> Document {
        let registry = Registry::builtin();
        Document::new("home")
            .add(&registry, "hero")
            .unwrap()
            .add(&registry, "text")
            .unwrap()
            .add(&registry, "faq")
            .unwrap()
    }

    /// Blocks stacked vertically, 100px tall each
    fn layout(doc: &Document) -> Vec<(BlockId, Rect)> {
        doc.uids()
            .into_iter()
            .enumerate()
            .map(|(i, uid)| (uid, Rect::new(0.0, i as f64 * 100.0, 800.0, 100.0)))
            .collect()
    }

    #[test]
    fn test_midpoint_resolves_to_after() {
        let rect = Rect::new(0.0, 100.0, 800.0, 50.0);

        assert_eq!(DropPosition::from_pointer(&rect, 100.0), DropPosition::Before);
        assert_eq!(DropPosition::from_pointer(&rect, 124.999), DropPosition::Before);
        assert_eq!(DropPosition::from_pointer(&rect, 125.0), DropPosition::After);
        assert_eq!(DropPosition::from_pointer(&rect, 150.0), DropPosition::After);
    }

    #[test]
    fn test_insertion_index() {
        let before = DropTarget {
            index: 2,
            position: DropPosition::Before,
        };
        let after = DropTarget {
            index: 2,
            position: DropPosition::After,
        };
        assert_eq!(before.insertion_index(), 2);
        assert_eq!(after.insertion_index(), 3);
    }

    #[test]
    fn test_closest_center() {
        let doc = doc();
        let layout = layout(&doc);

        assert_eq!(closest_center(Point::new(400.0, 10.0), &layout), Some(&layout[0].0));
        assert_eq!(closest_center(Point::new(400.0, 260.0), &layout), Some(&layout[2].0));
        assert_eq!(closest_center(Point::new(0.0, 0.0), &[]), None);

        // Equidistant from blocks 0 and 1: first wins
        assert_eq!(closest_center(Point::new(400.0, 100.0), &layout), Some(&layout[0].0));
    }

    #[test]
    fn test_reorder_requires_activation() {
        let doc = doc();
        let layout = layout(&doc);
        let mut drag = ReorderDrag::default();

        drag.pointer_down(layout[0].0.clone(), Point::new(10.0, 10.0));
        assert_eq!(drag.pointer_move(Point::new(12.0, 11.0), &layout), None);
        assert!(!drag.is_dragging());

        // A click without travel produces nothing
        assert_eq!(drag.pointer_up(&doc), None);
    }

    #[test]
    fn test_reorder_drag_moves_block() {
        let doc = doc();
        let layout = layout(&doc);
        let mut drag = ReorderDrag::default();

        drag.pointer_down(layout[0].0.clone(), Point::new(10.0, 10.0));
        let over = drag.pointer_move(Point::new(10.0, 250.0), &layout).cloned();

        assert_eq!(over.as_ref(), Some(&layout[2].0));
        assert_eq!(drag.active(), Some(&layout[0].0));
        assert_eq!(
            drag.pointer_up(&doc),
            Some(Mutation::MoveBlock { from: 0, to: 2 })
        );
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_reorder_onto_itself_is_noop() {
        let doc = doc();
        let layout = layout(&doc);
        let mut drag = ReorderDrag::default();

        drag.pointer_down(layout[1].0.clone(), Point::new(10.0, 110.0));
        drag.pointer_move(Point::new(10.0, 160.0), &layout);

        assert_eq!(drag.pointer_up(&doc), None);
    }

    #[test]
    fn test_reorder_resolves_indices_at_drop_time() {
        let registry = Registry::builtin();
        let doc = doc();
        let layout = layout(&doc);
        let mut drag = ReorderDrag::default();

        drag.pointer_down(layout[2].0.clone(), Point::new(10.0, 210.0));
        drag.pointer_move(Point::new(10.0, 10.0), &layout);

        // Something was inserted at the top while dragging
        let current = doc.insert_at(&registry, "cta", 0).unwrap();
        assert_eq!(
            drag.pointer_up(&current),
            Some(Mutation::MoveBlock { from: 3, to: 1 })
        );
    }

    #[test]
    fn test_reorder_of_removed_block_is_dropped() {
        let doc = doc();
        let layout = layout(&doc);
        let mut drag = ReorderDrag::default();

        drag.pointer_down(layout[0].0.clone(), Point::new(10.0, 10.0));
        drag.pointer_move(Point::new(10.0, 250.0), &layout);

        assert_eq!(drag.pointer_up(&doc.remove(0)), None);
    }

    #[test]
    fn test_palette_ignores_foreign_drags() {
        let doc = doc();
        let layout = layout(&doc);
        let mut palette = PaletteDrag::new();

        let mut files = DragData::new();
        files.set("Files", "photo.png");

        let accepted = palette.drag_over(&files, &doc, &layout[0].0, &layout[0].1, Point::new(5.0, 5.0));
        assert!(!accepted);
        assert_eq!(palette.target(), None);
        assert_eq!(palette.drop(&files, &doc), None);
    }

    #[test]
    fn test_palette_drop_before_first_block() {
        let doc = doc();
        let layout = layout(&doc);
        let mut palette = PaletteDrag::new();
        let data = DragData::for_block("gallery");

        palette.drag_over(&data, &doc, &layout[0].0, &layout[0].1, Point::new(5.0, 20.0));
        assert_eq!(
            palette.target(),
            Some(DropTarget {
                index: 0,
                position: DropPosition::Before
            })
        );

        assert_eq!(
            palette.drop(&data, &doc),
            Some(Mutation::InsertBlock {
                block_type: "gallery".to_string(),
                index: 0
            })
        );
        assert_eq!(palette.target(), None);
    }

    #[test]
    fn test_palette_drop_after_block() {
        let doc = doc();
        let layout = layout(&doc);
        let mut palette = PaletteDrag::new();
        let data = DragData::for_block("cta");

        palette.drag_over(&data, &doc, &layout[1].0, &layout[1].1, Point::new(5.0, 150.0));
        assert_eq!(
            palette.drop(&data, &doc),
            Some(Mutation::InsertBlock {
                block_type: "cta".to_string(),
                index: 2
            })
        );
    }

    #[test]
    fn test_palette_drop_on_empty_canvas_appends() {
        let doc = Document::new("empty");
        let mut palette = PaletteDrag::new();
        let data = DragData::for_block("hero");

        assert_eq!(
            palette.drop(&data, &doc),
            Some(Mutation::AddBlock {
                block_type: "hero".to_string()
            })
        );
    }

    #[test]
    fn test_drag_leave_only_clears_outside_container() {
        let doc = doc();
        let layout = layout(&doc);
        let container = Rect::new(0.0, 0.0, 800.0, 300.0);
        let mut palette = PaletteDrag::new();
        let data = DragData::for_block("hero");

        palette.drag_over(&data, &doc, &layout[1].0, &layout[1].1, Point::new(5.0, 120.0));

        // Leaving one block for its neighbour keeps the marker
        palette.drag_leave(&container, Point::new(5.0, 201.0));
        assert!(palette.target().is_some());

        palette.drag_leave(&container, Point::new(5.0, 420.0));
        assert_eq!(palette.target(), None);
    }

    #[test]
    fn test_palette_target_follows_document_changes() {
        let doc = doc();
        let layout = layout(&doc);
        let mut palette = PaletteDrag::new();
        let data = DragData::for_block("cta");

        palette.drag_over(&data, &doc, &layout[2].0, &layout[2].1, Point::new(5.0, 210.0));

        // First block removed before the drop lands
        let current = doc.remove(0);
        assert_eq!(
            palette.drop(&data, &current),
            Some(Mutation::InsertBlock {
                block_type: "cta".to_string(),
                index: 1
            })
        );

        // Anchor block gone entirely: fall back to append
        palette.drag_over(&data, &doc, &layout[2].0, &layout[2].1, Point::new(5.0, 210.0));
        let without_anchor = doc.remove(2);
        assert_eq!(
            palette.drop(&data, &without_anchor),
            Some(Mutation::AddBlock {
                block_type: "cta".to_string()
            })
        );
    }
}
