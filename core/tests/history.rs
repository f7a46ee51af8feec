use rte_core::{CommandStatus, Editor, EditorConfig, NoOpReason, Selection};

fn all(len: usize) -> Selection {
    Selection::within(vec![0], 0, len)
}

#[test]
fn undo_walks_back_to_the_empty_document() {
    let mut editor = Editor::default();
    let initial = editor.markup();
    assert_eq!(initial, "<p></p>");

    editor
        .apply("fragment:insert", Selection::caret(vec![0], 0), Some("hello".into()))
        .unwrap();
    editor.apply("bold", all(5), None).unwrap();
    editor.apply("heading:1", all(5), None).unwrap();
    assert_eq!(editor.markup(), "<h1><strong>hello</strong></h1>");

    for _ in 0..3 {
        let out = editor.apply("undo", Selection::default(), None).unwrap();
        assert_eq!(out.status, CommandStatus::Applied);
    }
    assert_eq!(editor.markup(), initial);
    assert!(!editor.can_undo());
    let out = editor.apply("undo", Selection::default(), None).unwrap();
    assert_eq!(out.status, CommandStatus::NoOp(NoOpReason::NothingToUndo));
}

#[test]
fn redo_restores_and_new_commands_drop_the_tail() {
    let mut editor = Editor::from_markup("<p>hello</p>");
    editor.apply("bold", all(5), None).unwrap();
    editor.apply("italic", all(5), None).unwrap();

    editor.apply("undo", Selection::default(), None).unwrap();
    assert_eq!(editor.markup(), "<p><strong>hello</strong></p>");
    let out = editor.apply("redo", Selection::default(), None).unwrap();
    assert_eq!(out.markup, "<p><strong><em>hello</em></strong></p>");
    assert!(!editor.can_redo());

    editor.apply("undo", Selection::default(), None).unwrap();
    assert!(editor.can_redo());
    editor.apply("underline", all(5), None).unwrap();
    assert!(!editor.can_redo());
    let out = editor.apply("redo", Selection::default(), None).unwrap();
    assert_eq!(out.status, CommandStatus::NoOp(NoOpReason::NothingToRedo));
    assert_eq!(out.markup, "<p><strong><u>hello</u></strong></p>");
}

#[test]
fn noops_and_errors_are_not_recorded() {
    let mut editor = Editor::from_markup("<p>hello</p>");
    editor.apply("bold", Selection::caret(vec![0], 1), None).unwrap();
    assert!(editor.apply("link:create", all(5), Some("vbscript:x".into())).is_err());
    assert!(!editor.can_undo());
    assert_eq!(editor.markup(), "<p>hello</p>");
}

#[test]
fn oldest_steps_fall_off_past_the_limit() {
    let mut editor = Editor::with_config(EditorConfig {
        history_limit: 2,
        initial_markup: Some("<p>hello</p>".to_string()),
        ..EditorConfig::default()
    });
    editor.apply("bold", all(5), None).unwrap();
    editor.apply("italic", all(5), None).unwrap();
    editor.apply("underline", all(5), None).unwrap();

    editor.apply("undo", Selection::default(), None).unwrap();
    editor.apply("undo", Selection::default(), None).unwrap();
    assert_eq!(editor.markup(), "<p><strong>hello</strong></p>");
    let out = editor.apply("undo", Selection::default(), None).unwrap();
    assert_eq!(out.status, CommandStatus::NoOp(NoOpReason::NothingToUndo));
}

#[test]
fn loading_markup_is_undoable_and_reset_is_not() {
    let mut editor = Editor::from_markup("<p>first</p>");
    let out = editor.load_markup("<p>second</p>");
    assert_eq!(out.status, CommandStatus::Applied);
    editor.apply("undo", Selection::default(), None).unwrap();
    assert_eq!(editor.markup(), "<p>first</p>");

    editor.reset_markup("<h2>fresh</h2>");
    assert_eq!(editor.markup(), "<h2>fresh</h2>");
    assert!(!editor.can_undo());
    assert!(!editor.can_redo());
}

#[test]
fn undo_restores_the_selection_of_that_state() {
    let mut editor = Editor::from_markup("<p>ab</p>");
    editor
        .apply("image:insert", Selection::caret(vec![0], 1), Some("x.png".into()))
        .unwrap();
    editor
        .apply("fragment:insert", Selection::caret(vec![0], 3), Some("cd".into()))
        .unwrap();
    let out = editor.apply("undo", Selection::default(), None).unwrap();
    assert_eq!(out.selection, Selection::caret(vec![0], 2));
}

#[test]
fn clearing_history_keeps_the_content() {
    let mut editor = Editor::from_markup("<p>hello</p>");
    editor.apply("bold", all(5), None).unwrap();
    editor.apply("italic", all(5), None).unwrap();
    editor.apply("undo", Selection::default(), None).unwrap();
    assert!(editor.can_undo() && editor.can_redo());

    editor.clear_history();
    assert!(!editor.can_undo());
    assert!(!editor.can_redo());
    assert_eq!(editor.markup(), "<p><strong>hello</strong></p>");
    editor.apply("underline", all(5), None).unwrap();
    editor.apply("undo", Selection::default(), None).unwrap();
    assert_eq!(editor.markup(), "<p><strong>hello</strong></p>");
}
