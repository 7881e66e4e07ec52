//! Tests for longer mutation sequences
//!
//! This tests:
//! - Insert + move + remove chains
//! - Undo/redo walking the whole history
//! - Batched mutations
//! - Scripts deserialized from JSON

use pagecraft_editor::{Mutation, UndoStack};
use pagecraft_model::{Document, PropertyPath, Registry};
use serde_json::json;

fn types(doc: &Document) -> Vec<&str> {
    doc.iter().map(|b| b.block_type()).collect()
}

#[test]
fn test_insert_move_remove_chain() {
    let registry = Registry::builtin();
    let mut doc = Document::new("chain");
    let mut stack = UndoStack::new();

    let script = [
        Mutation::AddBlock {
            block_type: "hero".to_string(),
        },
        Mutation::AddBlock {
            block_type: "text".to_string(),
        },
        Mutation::InsertBlock {
            block_type: "gallery".to_string(),
            index: 1,
        },
        Mutation::MoveBlock { from: 0, to: 2 },
        Mutation::InsertBlock {
            block_type: "cta".to_string(),
            index: -5,
        },
        Mutation::RemoveBlock { index: 2 },
    ];

    for mutation in &script {
        stack.apply(mutation, &mut doc, &registry).unwrap();
    }

    assert_eq!(types(&doc), vec!["cta", "gallery", "hero"]);
    assert_eq!(stack.undo_levels(), script.len());

    // Walk all the way back and forward again
    let final_uids = doc.uids();
    while stack.undo(&mut doc) {}
    assert!(doc.is_empty());

    while stack.redo(&mut doc) {}
    assert_eq!(doc.uids(), final_uids);
}

#[test]
fn test_uids_survive_every_non_creating_step() {
    let registry = Registry::builtin();
    let mut doc = Document::new("stable");
    let mut stack = UndoStack::new();

    for ty in ["hero", "faq", "jobs", "contact"] {
        stack
            .apply(
                &Mutation::AddBlock {
                    block_type: ty.to_string(),
                },
                &mut doc,
                &registry,
            )
            .unwrap();
    }
    let mut uids = doc.uids();
    uids.sort();

    let edits = [
        Mutation::MoveBlock { from: 3, to: 0 },
        Mutation::SetPath {
            index: 2,
            path: PropertyPath::item_field("items", 0, "title"),
            value: json!("Why us?"),
        },
        Mutation::PatchProps {
            index: 1,
            props: pagecraft_model::bag(json!({ "title": "Hello" })),
        },
        Mutation::MoveBlock { from: 0, to: 3 },
    ];
    for mutation in &edits {
        stack.apply(mutation, &mut doc, &registry).unwrap();

        let mut now = doc.uids();
        now.sort();
        assert_eq!(now, uids, "after {}", mutation.name());
    }
}

#[test]
fn test_batch_undoes_as_one() {
    let registry = Registry::builtin();
    let mut doc = Document::new("batch").add(&registry, "hero").unwrap();
    let mut stack = UndoStack::new();

    stack.begin_batch(&doc);
    for ty in ["text", "gallery", "cta"] {
        stack
            .apply(
                &Mutation::AddBlock {
                    block_type: ty.to_string(),
                },
                &mut doc,
                &registry,
            )
            .unwrap();
    }
    stack.end_batch();

    assert_eq!(doc.len(), 4);
    assert_eq!(stack.undo_levels(), 1);

    stack.undo(&mut doc);
    assert_eq!(types(&doc), vec!["hero"]);
}

#[test]
fn test_failed_mutation_leaves_history_alone() {
    let registry = Registry::builtin();
    let mut doc = Document::new("fail").add(&registry, "hero").unwrap();
    let mut stack = UndoStack::new();

    let result = stack.apply(
        &Mutation::InsertBlock {
            block_type: "slider".to_string(),
            index: 0,
        },
        &mut doc,
        &registry,
    );

    assert!(result.is_err());
    assert_eq!(types(&doc), vec!["hero"]);
    assert!(!stack.can_undo());
}

#[test]
fn test_script_from_json() {
    let registry = Registry::builtin();
    let script: Vec<Mutation> = serde_json::from_value(json!([
        { "op": "add_block", "block_type": "faq" },
        { "op": "add_block", "block_type": "hero" },
        { "op": "move_block", "from": 1, "to": 0 },
        {
            "op": "set_path",
            "index": 1,
            "path": { "kind": "item_field", "list": "items", "item": 0, "field": "subtitle" },
            "value": "We open at nine."
        }
    ]))
    .unwrap();

    let doc = script
        .iter()
        .try_fold(Document::new("script"), |doc, m| m.apply(&doc, &registry))
        .unwrap();

    assert_eq!(types(&doc), vec!["hero", "faq"]);
    assert_eq!(
        doc.value_at(1, &PropertyPath::item_field("items", 0, "subtitle")),
        Some(&json!("We open at nine."))
    );
}
