use folio_editor::EditorState;
use folio_model::{Block, BlockType, ContentState, EntityMap, SelectionState, TreeLinks};

fn node(
    key: &str,
    block_type: BlockType,
    text: &str,
    parent: Option<&str>,
    children: &[&str],
    prev: Option<&str>,
    next: Option<&str>,
) -> Block {
    Block::new(key, block_type, text).with_links(TreeLinks {
        parent: parent.map(String::from),
        children: children.iter().map(|c| c.to_string()).collect(),
        prev_sibling: prev.map(String::from),
        next_sibling: next.map(String::from),
    })
}

/// Nested sample document:
///
/// ```text
/// A "Alpha"
/// B
///   C
///     D "Delta"
///     E "Elephant"
///   F "Fire"
/// G "Gorila"
/// H " "
/// I "last"
/// ```
#[allow(dead_code)]
pub fn tree_blocks() -> Vec<Block> {
    vec![
        node("A", BlockType::Blockquote, "Alpha", None, &[], None, Some("B")),
        node("B", BlockType::OrderedListItem, "", None, &["C", "F"], Some("A"), Some("G")),
        node("C", BlockType::Blockquote, "", Some("B"), &["D", "E"], None, Some("F")),
        node("D", BlockType::HeaderTwo, "Delta", Some("C"), &[], None, Some("E")),
        node("E", BlockType::Unstyled, "Elephant", Some("C"), &[], Some("D"), None),
        node("F", BlockType::CodeBlock, "Fire", Some("B"), &[], Some("C"), None),
        node("G", BlockType::OrderedListItem, "Gorila", None, &[], Some("B"), Some("H")),
        node("H", BlockType::Atomic, " ", None, &[], Some("G"), Some("I")),
        node("I", BlockType::Unstyled, "last", None, &[], Some("H"), None),
    ]
}

#[allow(dead_code)]
pub fn editor_at(blocks: Vec<Block>, key: &str, offset: usize) -> EditorState {
    let content = ContentState::create_from_block_array(blocks, EntityMap::new()).unwrap();
    EditorState::create_with_content(content, None).force_selection(SelectionState::collapsed_at(key, offset))
}

#[allow(dead_code)]
pub fn keys(state: &EditorState) -> Vec<String> {
    state.current_content().block_map().keys().cloned().collect()
}
