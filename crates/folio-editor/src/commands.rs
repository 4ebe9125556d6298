//! Deletion commands and cursor movement.
//!
//! In tree content, forward delete never merges across a selection that
//! spans blocks, and at the end of a block it only merges a next sibling
//! that is a non-empty leaf.

use tracing::{debug, warn};

use folio_model::{ContentState, SelectionState};
use folio_modifier::{RemovalDirection, RemovalOptions, remove_range_with_options};

use crate::Result;
use crate::change_type::ChangeType;
use crate::editor_state::EditorState;

/// Remove the selection, or for a collapsed cursor the range `strategy`
/// picks. Returns `None` when nothing would be removed.
pub fn remove_text_with_strategy(
    state: &EditorState,
    strategy: impl FnOnce(&EditorState) -> Result<SelectionState>,
    direction: RemovalDirection,
    opts: RemovalOptions,
) -> Result<Option<ContentState>> {
    let selection = state.selection();
    let content = state.current_content();
    let tree = content.is_tree();

    if tree && direction == RemovalDirection::Forward && selection.anchor_key != selection.focus_key {
        warn!(anchor = %selection.anchor_key, focus = %selection.focus_key, "forward delete across tree blocks ignored");
        return Ok(None);
    }

    let mut target = selection.clone();
    if selection.is_collapsed() {
        match direction {
            RemovalDirection::Forward => {
                if state.is_selection_at_end_of_content() {
                    return Ok(None);
                }
                if tree {
                    let block = content.block_for_key(&selection.anchor_key)?;
                    if selection.anchor_offset == block.len() {
                        let mergeable = block
                            .next_sibling_key()
                            .and_then(|k| content.get_block(k))
                            .is_some_and(|next| next.is_leaf() && !next.is_empty());
                        if !mergeable {
                            warn!(key = %block.key(), "forward delete at tree block end ignored");
                            return Ok(None);
                        }
                    }
                }
            }
            RemovalDirection::Backward => {
                if state.is_selection_at_start_of_content() {
                    return Ok(None);
                }
            }
        }
        target = strategy(state)?;
        if target == *selection {
            return Ok(None);
        }
    }

    let after = remove_range_with_options(content, &target, direction, opts)?;
    if after.is_same(content) {
        return Ok(None);
    }
    Ok(Some(after))
}

/// Move the focus back by up to `max_distance` code units, onto the end of
/// the previous block when the cursor is closer to the block start.
pub fn move_selection_backward(state: &EditorState, max_distance: usize) -> Result<SelectionState> {
    let selection = state.selection();
    let content = state.current_content();
    let key = selection.start_key();
    let offset = selection.start_offset();

    let (focus_key, focus_offset) = if max_distance > offset {
        let before = if content.is_tree() {
            content.block_map().prev_leaf(key)
        } else {
            content.block_before(key)
        };
        match before {
            Some(block) => (block.key().to_string(), block.len()),
            None => (key.to_string(), 0),
        }
    } else {
        (key.to_string(), offset - max_distance)
    };

    Ok(SelectionState {
        focus_key,
        focus_offset,
        is_backward: true,
        ..selection.clone()
    })
}

/// Move the focus forward by up to `max_distance` code units, onto the start
/// of the next block when fewer remain in the current one. Tree content
/// skips to the next leaf.
pub fn move_selection_forward(state: &EditorState, max_distance: usize) -> Result<SelectionState> {
    let selection = state.selection();
    let content = state.current_content();
    let key = selection.start_key();
    let offset = selection.start_offset();
    let block = content.block_for_key(key)?;

    let (focus_key, focus_offset) = if max_distance > block.len().saturating_sub(offset) {
        let after = if content.is_tree() {
            content.block_map().next_leaf(key)
        } else {
            content.block_after(key)
        };
        match after {
            Some(next) => (next.key().to_string(), 0),
            None => (key.to_string(), block.len()),
        }
    } else {
        (key.to_string(), offset + max_distance)
    };

    Ok(SelectionState {
        focus_key,
        focus_offset,
        ..selection.clone()
    })
}

/// Backspace: remove the selection, or the character before a collapsed
/// cursor (both code units of a surrogate pair).
pub fn plain_backspace(state: &EditorState) -> Result<EditorState> {
    plain_backspace_with_options(state, RemovalOptions::default())
}

pub fn plain_backspace_with_options(state: &EditorState, opts: RemovalOptions) -> Result<EditorState> {
    Ok(try_plain_backspace(state, opts)?.unwrap_or_else(|| state.clone()))
}

pub(crate) fn try_plain_backspace(state: &EditorState, opts: RemovalOptions) -> Result<Option<EditorState>> {
    let strategy = |s: &EditorState| {
        let selection = s.selection();
        let block = s.current_content().block_for_key(&selection.anchor_key)?;
        let distance = block.text().char_len_before(selection.anchor_offset).max(1);
        move_selection_backward(s, distance)
    };
    let Some(after) = remove_text_with_strategy(state, strategy, RemovalDirection::Backward, opts)? else {
        return Ok(None);
    };
    let selection = state.selection();
    let change = if selection.is_collapsed() {
        ChangeType::BackspaceCharacter
    } else {
        ChangeType::RemoveRange
    };
    debug!(change = %change, key = %selection.anchor_key, offset = selection.anchor_offset, "backspace");
    Ok(Some(state.push(after.with_selection_before(selection.clone()), change)))
}

/// Forward delete: remove the selection, or the character after a collapsed
/// cursor.
pub fn plain_delete(state: &EditorState) -> Result<EditorState> {
    plain_delete_with_options(state, RemovalOptions::default())
}

pub fn plain_delete_with_options(state: &EditorState, opts: RemovalOptions) -> Result<EditorState> {
    let strategy = |s: &EditorState| {
        let selection = s.selection();
        let block = s.current_content().block_for_key(&selection.anchor_key)?;
        let distance = block.text().char_len_at(selection.anchor_offset).max(1);
        move_selection_forward(s, distance)
    };
    let Some(after) = remove_text_with_strategy(state, strategy, RemovalDirection::Forward, opts)? else {
        return Ok(state.clone());
    };
    let selection = state.selection();
    let change = if selection.is_collapsed() {
        ChangeType::DeleteCharacter
    } else {
        ChangeType::RemoveRange
    };
    debug!(change = %change, key = %selection.anchor_key, offset = selection.anchor_offset, "delete");
    Ok(state.push(after.with_selection_before(selection.clone()), change))
}
