//! Folding an externally edited text surface back into the model.
//!
//! A spellchecker or autocorrect may rewrite the text of one rendered leaf
//! without going through any edit command. The caller reports what the leaf
//! now contains and where the surface selection is; `reconcile_surface`
//! turns that into a regular history entry.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use folio_model::{BlockKey, Mutability, SelectionState, Utf16Text};
use folio_modifier::{RemovalOptions, replace_text};

use crate::Result;
use crate::change_type::ChangeType;
use crate::commands::try_plain_backspace;
use crate::editor_state::EditorState;
use crate::error::EditorError;
use crate::offset_key::OffsetKey;

/// Blank final lines are rendered with one extra newline.
const DOUBLE_NEWLINE: &str = "\n\n";

/// Which selection to believe after an external edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionTrust {
    /// Use the reported anchor and focus as given. For surfaces whose
    /// selection does not move while the edit happens.
    Reported,
    /// Shift the model's own selection by the change in length.
    #[default]
    Model,
}

/// High-level classification the surface attached to the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputType {
    DeleteContentBackward,
    #[serde(untagged)]
    Other(String),
}

/// What the surface shows for one leaf after an external edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceInput {
    pub block_key: BlockKey,
    /// The leaf's window in the block's text, in code units.
    pub leaf: Range<usize>,
    pub observed_text: String,
    /// Reported selection, relative to the leaf start.
    pub anchor_offset: usize,
    pub focus_offset: usize,
    pub is_collapsed: bool,
    #[serde(default)]
    pub trust: SelectionTrust,
    #[serde(default)]
    pub input_type: Option<InputType>,
}

impl SurfaceInput {
    /// Input for the leaf addressed by `offset_key`, with the reported
    /// selection collapsed at `caret` (relative to the leaf start).
    pub fn for_offset_key(
        state: &EditorState,
        offset_key: &OffsetKey,
        observed_text: impl Into<String>,
        caret: usize,
    ) -> Result<Self> {
        let unknown = || EditorError::UnknownLeaf {
            block: offset_key.block_key.clone(),
            decorator: offset_key.decorator,
            leaf: offset_key.leaf,
        };
        let tree = state.block_tree(&offset_key.block_key).ok_or_else(unknown)?;
        let leaf = tree.leaf(offset_key.decorator, offset_key.leaf).ok_or_else(unknown)?;
        Ok(Self {
            block_key: offset_key.block_key.clone(),
            leaf: leaf.start..leaf.end,
            observed_text: observed_text.into(),
            anchor_offset: caret,
            focus_offset: caret,
            is_collapsed: true,
            trust: SelectionTrust::default(),
            input_type: None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum SurfaceOutcome {
    /// The surface already matches the model.
    Unchanged,
    /// Text matched, and the reported input type was applied as a command.
    Dispatched(EditorState),
    /// The leaf text was replaced with what the surface shows.
    Updated(EditorState),
}

impl SurfaceOutcome {
    pub fn state(&self) -> Option<&EditorState> {
        match self {
            SurfaceOutcome::Unchanged => None,
            SurfaceOutcome::Dispatched(state) | SurfaceOutcome::Updated(state) => Some(state),
        }
    }
}

pub fn reconcile_surface(state: &EditorState, input: &SurfaceInput) -> Result<SurfaceOutcome> {
    let content = state.current_content();
    let block = content.block_for_key(&input.block_key)?;
    let Range { start, end } = input.leaf.clone();
    if start > end || end > block.len() {
        return Err(EditorError::LeafOutOfRange {
            block: input.block_key.clone(),
            start,
            end,
            len: block.len(),
        });
    }

    let model_text = block.text().slice(start..end);
    let mut observed = Utf16Text::from(input.observed_text.as_str());
    if observed.ends_with(DOUBLE_NEWLINE) {
        observed = observed.slice(0..observed.len() - 1);
    }

    if observed == model_text {
        if input.input_type == Some(InputType::DeleteContentBackward) {
            if let Some(next) = try_plain_backspace(state, RemovalOptions::default())? {
                debug!(key = %input.block_key, "surface backspace dispatched");
                return Ok(SurfaceOutcome::Dispatched(next));
            }
        }
        return Ok(SurfaceOutcome::Unchanged);
    }

    let selection = state.selection();
    let target = SelectionState {
        anchor_key: input.block_key.clone(),
        anchor_offset: start,
        focus_key: input.block_key.clone(),
        focus_offset: end,
        is_backward: false,
        has_focus: selection.has_focus,
    };

    let entity = block.entity_at(start);
    let preserve_entity = match entity {
        Some(key) => content.entity(key)?.mutability == Mutability::Mutable,
        None => false,
    };
    // Immutable and segmented entities cannot survive a partial rewrite.
    let change_type = if preserve_entity {
        ChangeType::SpellcheckChange
    } else {
        ChangeType::ApplyEntity
    };

    let replaced = replace_text(
        content,
        &target,
        observed.clone(),
        &block.inline_style_at(start),
        entity.filter(|_| preserve_entity),
    )?;

    let delta = observed.len() as isize - model_text.len() as isize;
    let shift = |offset: usize| offset.saturating_add_signed(delta);
    let mut after = match input.trust {
        SelectionTrust::Reported => {
            let lo = start + input.anchor_offset.min(input.focus_offset);
            let hi = lo + input.anchor_offset.abs_diff(input.focus_offset);
            SelectionState {
                anchor_key: input.block_key.clone(),
                anchor_offset: lo,
                focus_key: input.block_key.clone(),
                focus_offset: hi,
                is_backward: false,
                has_focus: selection.has_focus,
            }
        }
        SelectionTrust::Model => {
            let end_offset = selection.end_offset();
            SelectionState {
                anchor_key: selection.start_key().to_string(),
                anchor_offset: if input.is_collapsed {
                    shift(end_offset)
                } else {
                    selection.start_offset()
                },
                focus_key: selection.end_key().to_string(),
                focus_offset: shift(end_offset),
                is_backward: false,
                has_focus: selection.has_focus,
            }
        }
    };

    // Keep the selection inside the rewritten text.
    for (key, offset) in [
        (&after.anchor_key, &mut after.anchor_offset),
        (&after.focus_key, &mut after.focus_offset),
    ] {
        let len = replaced.get_block(key).map_or(0, |b| b.len());
        *offset = (*offset).min(len);
    }

    debug!(
        key = %input.block_key,
        start,
        end,
        delta,
        change = %change_type,
        "surface text reconciled"
    );
    let replaced = replaced
        .with_selection_before(content.selection_after().clone())
        .with_selection_after(after);
    Ok(SurfaceOutcome::Updated(state.push_inner(replaced, change_type, true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::ContentState;

    fn state(text: &str, offset: usize) -> EditorState {
        EditorState::create_with_content(ContentState::create_from_text(text), None)
            .force_selection(SelectionState::collapsed_at("b0", offset))
    }

    fn input(observed: &str, leaf: Range<usize>, caret: usize) -> SurfaceInput {
        SurfaceInput {
            block_key: "b0".into(),
            leaf,
            observed_text: observed.into(),
            anchor_offset: caret,
            focus_offset: caret,
            is_collapsed: true,
            trust: SelectionTrust::Model,
            input_type: None,
        }
    }

    #[test]
    fn trailing_soft_newline_is_ignored() {
        let content = ContentState::create_from_text_with_delimiter("line\n", "\u{2029}");
        let state = EditorState::create_with_content(content, None);
        let outcome = reconcile_surface(&state, &input("line\n\n", 0..5, 0)).unwrap();
        assert!(matches!(outcome, SurfaceOutcome::Unchanged));
    }

    #[test]
    fn model_trust_shifts_selection_by_delta() {
        let state = state("teh cat", 3);
        let outcome = reconcile_surface(&state, &input("the cat!", 0..7, 0)).unwrap();
        let SurfaceOutcome::Updated(next) = outcome else {
            panic!("expected update");
        };
        assert_eq!(next.current_content().plain_text("\n"), "the cat!");
        assert_eq!(next.selection().anchor_offset, 4);
        assert_eq!(next.selection().focus_offset, 4);
        assert_eq!(next.last_change_type(), Some(ChangeType::ApplyEntity));
        assert_eq!(next.current_content().selection_before(), state.current_content().selection_after());
        assert_eq!(next.undo().current_content().plain_text("\n"), "teh cat");
    }

    #[test]
    fn reported_trust_uses_surface_offsets() {
        let state = state("one teh two", 0);
        let mut report = input("the", 4..7, 3);
        report.anchor_offset = 3;
        report.focus_offset = 1;
        report.is_collapsed = false;
        report.trust = SelectionTrust::Reported;
        let next = reconcile_surface(&state, &report).unwrap();
        let next = next.state().unwrap();
        assert_eq!(next.current_content().plain_text("\n"), "one the two");
        assert_eq!((next.selection().anchor_offset, next.selection().focus_offset), (5, 7));
    }

    #[test]
    fn backspace_classification_is_dispatched() {
        let state = state("abc", 2);
        let mut report = input("abc", 0..3, 2);
        report.input_type = Some(InputType::DeleteContentBackward);
        let SurfaceOutcome::Dispatched(next) = reconcile_surface(&state, &report).unwrap() else {
            panic!("expected dispatch");
        };
        assert_eq!(next.current_content().plain_text("\n"), "ac");

        let at_start = self::state("abc", 0);
        let outcome = reconcile_surface(&at_start, &report).unwrap();
        assert!(matches!(outcome, SurfaceOutcome::Unchanged));
    }

    #[test]
    fn leaf_window_must_fit() {
        let err = reconcile_surface(&state("ab", 0), &input("x", 1..4, 0)).unwrap_err();
        assert!(matches!(err, EditorError::LeafOutOfRange { end: 4, len: 2, .. }));
    }

    #[test]
    fn input_from_offset_key() {
        let state = state("hello", 0);
        let key = OffsetKey::new("b0", 0, 0);
        let report = SurfaceInput::for_offset_key(&state, &key, "hallo", 1).unwrap();
        assert_eq!(report.leaf, 0..5);
        assert!(SurfaceInput::for_offset_key(&state, &OffsetKey::new("b0", 1, 0), "", 0).is_err());
    }
}
