use crate::block_map::BlockMap;
use crate::content::ContentState;
use crate::diagnostics::{DiagnosticCode, ValidationDiagnostic, ValidationError};
use crate::selection::SelectionState;

/// Validator configuration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Also check `selection_after` against the blocks.
    pub check_selections: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            check_selections: true,
        }
    }
}

/// Validate the structural invariants of a snapshot.
///
/// Rules:
/// - at least one block
/// - character list length == text length for every block
/// - every referenced entity key exists in the entity map
/// - blocks are either all flat or all tree blocks
/// - tree links are mutually consistent and map order is a pre-order walk
/// - `selection_after` references an existing block within bounds
pub fn validate_content(content: &ContentState) -> Result<(), ValidationError> {
    validate_content_with_options(content, ValidateOptions::default())
}

pub fn validate_content_with_options(
    content: &ContentState,
    opts: ValidateOptions,
) -> Result<(), ValidationError> {
    let mut diags = Vec::new();
    let map = content.block_map();

    if map.is_empty() {
        diags.push(ValidationDiagnostic::new(
            DiagnosticCode::EmptyDocument,
            None,
            "document has no blocks",
        ));
    }

    for block in map.blocks() {
        if block.characters().len() != block.len() {
            diags.push(ValidationDiagnostic::new(
                DiagnosticCode::CharacterListMismatch,
                Some(block.key()),
                format!(
                    "block '{}' has {} character entries for {} text units",
                    block.key(),
                    block.characters().len(),
                    block.len()
                ),
            ));
        }
        let mut reported = Vec::new();
        for entity in block.characters().iter().filter_map(|c| c.entity()) {
            if !content.entity_map().contains(entity) && !reported.contains(&entity) {
                reported.push(entity);
                diags.push(ValidationDiagnostic::new(
                    DiagnosticCode::UnknownEntity,
                    Some(block.key()),
                    format!("block '{}' references unknown entity {entity}", block.key()),
                ));
            }
        }
    }

    let tree_count = map.blocks().filter(|b| b.is_tree()).count();
    if tree_count > 0 && tree_count < map.len() {
        diags.push(ValidationDiagnostic::new(
            DiagnosticCode::MixedBlockShapes,
            None,
            format!("{tree_count} of {} blocks are tree blocks", map.len()),
        ));
    } else if tree_count > 0 {
        check_tree(map, &mut diags);
    }

    // `selection_before` addresses the previous snapshot and may name blocks
    // an edit removed.
    if opts.check_selections {
        check_selection(map, "selection_after", content.selection_after(), &mut diags);
    }

    if diags.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { diagnostics: diags })
    }
}

fn check_tree(map: &BlockMap, diags: &mut Vec<ValidationDiagnostic>) {
    let mut links_ok = true;

    for block in map.blocks() {
        let key = block.key();
        if let Some(parent) = block.parent_key() {
            match map.get(parent) {
                None => {
                    links_ok = false;
                    diags.push(dangling(key, "parent", parent));
                }
                Some(p) if !p.child_keys().iter().any(|c| c == key) => {
                    links_ok = false;
                    diags.push(ValidationDiagnostic::new(
                        DiagnosticCode::ParentChildMismatch,
                        Some(key),
                        format!("parent '{parent}' does not list '{key}' as a child"),
                    ));
                }
                Some(_) => {}
            }
        }
        for child in block.child_keys() {
            match map.get(child) {
                None => {
                    links_ok = false;
                    diags.push(dangling(key, "child", child));
                }
                Some(c) if c.parent_key() != Some(key) => {
                    links_ok = false;
                    diags.push(ValidationDiagnostic::new(
                        DiagnosticCode::ParentChildMismatch,
                        Some(key),
                        format!("child '{child}' of '{key}' names a different parent"),
                    ));
                }
                Some(_) => {}
            }
        }
        for (label, sibling) in [
            ("previous sibling", block.prev_sibling_key()),
            ("next sibling", block.next_sibling_key()),
        ] {
            if let Some(s) = sibling {
                if !map.contains_key(s) {
                    links_ok = false;
                    diags.push(dangling(key, label, s));
                }
            }
        }
    }

    if !links_ok {
        return;
    }

    let layout = map.tree_layout();
    let mut lists: Vec<&[String]> = vec![layout.roots.as_slice()];
    lists.extend(layout.children.values().map(Vec::as_slice));
    for siblings in lists {
        for (i, key) in siblings.iter().enumerate() {
            let Some(block) = map.get(key) else { continue };
            let prev = i.checked_sub(1).map(|j| siblings[j].as_str());
            let next = siblings.get(i + 1).map(String::as_str);
            if block.prev_sibling_key() != prev || block.next_sibling_key() != next {
                diags.push(ValidationDiagnostic::new(
                    DiagnosticCode::SiblingMismatch,
                    Some(key),
                    format!(
                        "block '{key}' has siblings {:?}/{:?}, expected {:?}/{:?}",
                        block.prev_sibling_key(),
                        block.next_sibling_key(),
                        prev,
                        next
                    ),
                ));
            }
        }
    }

    match map.relinked(&[], &layout) {
        Ok(walked) => {
            if !walked.keys().eq(map.keys()) {
                diags.push(ValidationDiagnostic::new(
                    DiagnosticCode::OrderMismatch,
                    None,
                    "block order is not a pre-order walk of the tree",
                ));
            }
        }
        Err(e) => diags.push(ValidationDiagnostic::new(
            DiagnosticCode::OrderMismatch,
            None,
            format!("tree cannot be walked: {e}"),
        )),
    }
}

fn dangling(key: &str, label: &str, target: &str) -> ValidationDiagnostic {
    ValidationDiagnostic::new(
        DiagnosticCode::DanglingLink,
        Some(key),
        format!("block '{key}' has {label} '{target}' which does not exist"),
    )
}

fn check_selection(
    map: &BlockMap,
    name: &str,
    sel: &SelectionState,
    diags: &mut Vec<ValidationDiagnostic>,
) {
    for (key, offset) in [
        (sel.anchor_key.as_str(), sel.anchor_offset),
        (sel.focus_key.as_str(), sel.focus_offset),
    ] {
        let ok = map.get(key).is_some_and(|b| offset <= b.len());
        if !ok {
            diags.push(ValidationDiagnostic::new(
                DiagnosticCode::SelectionOutOfRange,
                Some(key),
                format!("{name} points at '{key}'@{offset}, outside the document"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, TreeLinks};
    use crate::block_type::BlockType;
    use crate::character::CharacterMetadata;
    use crate::entity::{EntityKey, EntityMap};

    fn node(key: &str, links: TreeLinks) -> Block {
        Block::new(key, BlockType::Unstyled, key).with_links(links)
    }

    #[test]
    fn fresh_content_is_valid() {
        let content = ContentState::create_from_text("a\nb");
        assert!(validate_content(&content).is_ok());
    }

    #[test]
    fn unknown_entity_is_reported() {
        let block = Block::with_characters(
            "a",
            BlockType::Unstyled,
            "x",
            vec![CharacterMetadata::empty().apply_entity(Some(EntityKey(9)))],
        )
        .unwrap();
        let content = ContentState::create_from_block_array(vec![block], EntityMap::new()).unwrap();
        let err = validate_content(&content).unwrap_err();
        assert!(err.has_code(DiagnosticCode::UnknownEntity));
    }

    #[test]
    fn broken_sibling_links_are_reported() {
        let blocks = vec![
            node(
                "a",
                TreeLinks {
                    next_sibling: Some("b".into()),
                    ..Default::default()
                },
            ),
            // Missing prev_sibling back-link.
            node("b", TreeLinks::default()),
        ];
        let content = ContentState::create_from_block_array(blocks, EntityMap::new()).unwrap();
        let err = validate_content(&content).unwrap_err();
        assert!(err.has_code(DiagnosticCode::SiblingMismatch));
    }

    #[test]
    fn parent_must_list_child() {
        let blocks = vec![
            node("p", TreeLinks::default()),
            node(
                "c",
                TreeLinks {
                    parent: Some("p".into()),
                    ..Default::default()
                },
            ),
        ];
        let content = ContentState::create_from_block_array(blocks, EntityMap::new()).unwrap();
        let err = validate_content(&content).unwrap_err();
        assert!(err.has_code(DiagnosticCode::ParentChildMismatch));
    }

    #[test]
    fn selection_out_of_range_can_be_skipped() {
        let content = ContentState::create_from_text("ab")
            .with_selection_after(SelectionState::collapsed_at("b0", 5));
        assert!(validate_content(&content)
            .unwrap_err()
            .has_code(DiagnosticCode::SelectionOutOfRange));
        let opts = ValidateOptions {
            check_selections: false,
        };
        assert!(validate_content_with_options(&content, opts).is_ok());
    }
}
