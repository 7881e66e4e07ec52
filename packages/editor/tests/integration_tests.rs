//! Integration tests for editor crate

use pagecraft_editor::{
    bound_text, DragData, DropPosition, DropTarget, EditKey, EditMode, EditSession, EditorError,
    InlineEditor, KeyOutcome, Mutation, Point, PreviewPatch, Rect,
};
use pagecraft_model::{bag, BlockId, BlockRecord, Document, PropertyPath, Registry};
use serde_json::json;
use tempfile::TempDir;

fn two_block_session() -> (EditSession, BlockId, BlockId) {
    let registry = Registry::builtin();
    let doc = Document::new("home")
        .add(&registry, "hero")
        .unwrap()
        .add(&registry, "text")
        .unwrap();
    let uids = doc.uids();
    (
        EditSession::new("test-client", registry, doc),
        uids[0].clone(),
        uids[1].clone(),
    )
}

#[test]
fn test_palette_insert_before_first_block() {
    let (mut session, a, b) = two_block_session();
    let data = DragData::for_block("gallery");
    let rect = Rect::new(0.0, 0.0, 800.0, 200.0);

    // Pointer in the top half of A
    let doc = session.document().clone();
    assert!(session.palette().drag_over(&data, &doc, &a, &rect, Point::new(40.0, 60.0)));
    assert_eq!(
        session.palette().target(),
        Some(DropTarget {
            index: 0,
            position: DropPosition::Before
        })
    );

    assert!(session.drop_palette(&data).unwrap());

    let doc = session.document();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.get(0).unwrap().block_type(), "gallery");
    assert_ne!(doc.uids()[0], a);
    assert_ne!(doc.uids()[0], b);
    assert_eq!(doc.uids()[1..], [a, b]);
    assert_eq!(session.palette().target(), None);
}

#[test]
fn test_file_drag_is_ignored() {
    let (mut session, a, _) = two_block_session();
    let mut files = DragData::new();
    files.set("Files", "logo.svg");

    let doc = session.document().clone();
    let rect = Rect::new(0.0, 0.0, 800.0, 200.0);
    assert!(!session.palette().drag_over(&files, &doc, &a, &rect, Point::new(1.0, 1.0)));
    assert!(!session.drop_palette(&files).unwrap());
    assert_eq!(session.version(), 0);
}

#[test]
fn test_inline_edit_of_nested_item() {
    let registry = Registry::builtin();
    let record = BlockRecord {
        uid: Some("faq-1".to_string()),
        block_type: "faq".to_string(),
        props: bag(json!({
            "items": [
                { "title": "X", "subtitle": "x" },
                { "title": "Y", "subtitle": "y" }
            ]
        })),
    };
    let doc = Document::from_records("help", vec![record]);
    let mut session = EditSession::new("test-client", registry, doc);

    let uid = BlockId::from("faq-1");
    let path = PropertyPath::item_field("items", 1, "title");

    let mut editor = InlineEditor::new(EditMode::SingleLine, bound_text(session.document(), 0, &path));
    editor.focus();
    editor.input("Z ");
    let KeyOutcome::Committed(Some(text)) = editor.key_down(EditKey::Enter) else {
        panic!("enter should commit a changed single-line editor");
    };

    assert!(session.commit_inline(&uid, path, &text).unwrap());
    assert_eq!(
        session.document().get(0).unwrap().prop("items"),
        Some(&json!([
            { "title": "X", "subtitle": "x" },
            { "title": "Z", "subtitle": "y" }
        ]))
    );
}

#[test]
fn test_list_identities_survive_edit_of_sibling_row() {
    let (mut session, _, _) = two_block_session();
    session
        .apply(Mutation::AddBlock {
            block_type: "faq".to_string(),
        })
        .unwrap();
    let faq = session.document().uids()[2].clone();

    session
        .apply(Mutation::PatchProps {
            index: 2,
            props: bag(json!({
                "items": [
                    { "title": "Q1", "subtitle": "A1" },
                    { "title": "Q2", "subtitle": "A2" }
                ]
            })),
        })
        .unwrap();

    let before = session.list_rows(&faq, "items");
    session
        .commit_inline(&faq, PropertyPath::item_field("items", 0, "title"), "Q1 edited")
        .unwrap();
    session
        .apply(Mutation::MoveBlock { from: 2, to: 0 })
        .unwrap();
    let after = session.list_rows(&faq, "items");

    // The edited row's fingerprint changed; its sibling keeps its identity
    assert_ne!(after[0].id, before[0].id);
    assert_eq!(after[1].id, before[1].id);
}

#[test]
fn test_undo_redo_through_session() {
    let (mut session, a, b) = two_block_session();

    session.apply(Mutation::MoveBlock { from: 0, to: 1 }).unwrap();
    assert_eq!(session.document().uids(), vec![b.clone(), a.clone()]);

    assert!(session.undo());
    assert_eq!(session.document().uids(), vec![a.clone(), b.clone()]);

    assert!(session.redo());
    assert_eq!(session.document().uids(), vec![b, a]);
    assert!(!session.redo());
}

#[test]
fn test_undo_then_add_never_reuses_uid() {
    let (mut session, _, _) = two_block_session();

    session
        .apply(Mutation::AddBlock {
            block_type: "cta".to_string(),
        })
        .unwrap();
    let undone = session.document().uids()[2].clone();
    session.undo();

    session
        .apply(Mutation::AddBlock {
            block_type: "cta".to_string(),
        })
        .unwrap();
    assert_ne!(session.document().uids()[2], undone);
}

#[test]
fn test_preview_tracks_session() {
    let (mut session, a, _) = two_block_session();
    assert_eq!(session.open_preview().len(), 2);

    session
        .commit_inline(&a, PropertyPath::key("title"), "Welcome")
        .unwrap();
    let patches = session.refresh_preview();

    assert_eq!(patches.len(), 1);
    match &patches[0] {
        PreviewPatch::Update { block } => assert_eq!(block.uid(), &a),
        other => panic!("expected update, got {:?}", other),
    }

    session.close_preview();
    session.apply(Mutation::RemoveBlock { index: 0 }).unwrap();
    assert!(session.refresh_preview().is_empty());
}

#[test]
fn test_load_edit_save_roundtrip() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("about.json");
    std::fs::write(
        &path,
        serde_json::to_string(&json!([
            { "uid": "h1", "type": "hero", "props": { "title": "About us" } },
            { "type": "text", "props": { "body": "Since 1998" } }
        ]))?,
    )?;

    let mut session = EditSession::load(&path, Registry::builtin())?;
    assert_eq!(session.id, "about");
    assert_eq!(session.document().len(), 2);

    session.commit_inline(&BlockId::from("h1"), PropertyPath::key("title"), "Our story")?;
    assert!(session.is_dirty());

    session.save()?;
    assert!(!session.is_dirty());

    let reloaded = EditSession::load(&path, Registry::builtin())?;
    assert_eq!(reloaded.document(), session.document());
    assert_eq!(
        reloaded.document().get(0).and_then(|b| b.prop_str("title")),
        Some("Our story")
    );
    Ok(())
}

#[test]
fn test_load_rejects_malformed_page() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = EditSession::load(&path, Registry::builtin());
    assert!(matches!(result, Err(EditorError::Model(_))));
}
