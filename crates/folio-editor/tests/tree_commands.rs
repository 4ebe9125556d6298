mod util;

use folio_editor::{ChangeType, plain_backspace, plain_delete};
use folio_model::{SelectionState, validate_content};

use util::{editor_at, keys, tree_blocks};

fn text(state: &folio_editor::EditorState, key: &str) -> String {
    state.current_content().block_for_key(key).unwrap().text().to_string_lossy()
}

#[test]
fn forward_delete_into_leaf_sibling_concatenates() {
    let state = editor_at(tree_blocks(), "D", 5);
    let next = plain_delete(&state).unwrap();

    validate_content(next.current_content()).unwrap();
    assert_eq!(text(&next, "D"), "DeltaElephant");
    assert_eq!(keys(&next), ["A", "B", "C", "D", "F", "G", "H", "I"]);
    assert_eq!(next.selection(), &SelectionState::collapsed_at("D", 5).with_focus(true));
    assert_eq!(next.last_change_type(), Some(ChangeType::DeleteCharacter));
}

#[test]
fn forward_delete_without_leaf_sibling_is_a_no_op() {
    // A's next sibling has children; E and F have no next sibling.
    for (key, offset) in [("A", 5), ("E", 8), ("F", 4)] {
        let state = editor_at(tree_blocks(), key, offset);
        let next = plain_delete(&state).unwrap();
        assert!(next.is_same(&state), "{key}");
        assert!(next.current_content().block_map().same_storage(state.current_content().block_map()));
    }
}

#[test]
fn forward_delete_into_empty_sibling_is_a_no_op() {
    let mut blocks = tree_blocks();
    blocks[4] = blocks[4].with_content("".into(), Vec::new()).unwrap();
    let state = editor_at(blocks, "D", 5);
    assert!(plain_delete(&state).unwrap().is_same(&state));
}

#[test]
fn forward_delete_across_blocks_is_a_no_op() {
    let state = editor_at(tree_blocks(), "D", 5);
    let state = state.force_selection(SelectionState::range("D", 5, "E", 8));
    let next = plain_delete(&state).unwrap();
    assert!(next.is_same(&state));
}

#[test]
fn forward_delete_inside_a_block_removes_one_character() {
    let state = editor_at(tree_blocks(), "G", 0);
    let next = plain_delete(&state).unwrap();
    assert_eq!(text(&next, "G"), "orila");
}

#[test]
fn backspace_at_leaf_start_merges_into_previous_leaf() {
    let next = plain_backspace(&editor_at(tree_blocks(), "E", 0)).unwrap();
    validate_content(next.current_content()).unwrap();
    assert_eq!(text(&next, "D"), "DeltaElephant");
    assert_eq!(next.last_change_type(), Some(ChangeType::BackspaceCharacter));

    // The block before D in document order is its container; backspace skips to leaf A.
    let next = plain_backspace(&editor_at(tree_blocks(), "D", 0)).unwrap();
    validate_content(next.current_content()).unwrap();
    assert_eq!(text(&next, "A"), "AlphaDelta");
    assert_eq!(keys(&next), ["A", "B", "C", "E", "F", "G", "H", "I"]);
}

#[test]
fn undo_restores_tree_and_selection() {
    let state = editor_at(tree_blocks(), "D", 5);
    let next = plain_delete(&state).unwrap();
    let undone = next.undo();
    assert_eq!(undone.current_content().block_map(), state.current_content().block_map());
    assert_eq!(undone.selection(), state.selection());
}
