//! Edit scripts: a JSON list of editor operations replayed against a
//! document.
//!
//! ```json
//! {"v": 1, "ops": [
//!   {"op": "select", "anchorKey": "b0", "anchorOffset": 5},
//!   {"op": "insertText", "text": " world"},
//!   {"op": "backspace"},
//!   {"op": "undo"}
//! ]}
//! ```
//!
//! Every step goes through `EditorState::push` (or a command that does), so
//! a script exercises the same history rules as interactive editing.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use folio_editor::{
    ChangeType, EditorError, EditorState, HistoryOptions, SurfaceInput, SurfaceOutcome, plain_backspace_with_options,
    plain_delete_with_options, reconcile_surface,
};
use folio_model::{BlockType, ContentState, InlineStyle, ModelError, Mutability, SelectionState};
use folio_modifier::{RemovalDirection, RemovalOptions};

use crate::version::SCRIPT_V;

fn default_v() -> u8 {
    SCRIPT_V
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    #[serde(default = "default_v")]
    pub v: u8,
    pub ops: Vec<ScriptOp>,
}

/// Entity created by an `applyEntity` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mutability: Mutability,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ScriptOp {
    /// Move the selection. `focus*` default to the anchor (a caret).
    #[serde(rename_all = "camelCase")]
    Select {
        anchor_key: String,
        anchor_offset: usize,
        #[serde(default)]
        focus_key: Option<String>,
        #[serde(default)]
        focus_offset: Option<usize>,
    },
    /// Type `text` at the selection, replacing a range. Without `style` the
    /// current inline style is used.
    InsertText {
        text: String,
        #[serde(default)]
        style: Option<Vec<String>>,
    },
    Backspace,
    Delete,
    /// Remove the selection, then split the block at the caret.
    SplitBlock,
    ApplyInlineStyle {
        style: String,
    },
    RemoveInlineStyle {
        style: String,
    },
    #[serde(rename_all = "camelCase")]
    SetBlockType {
        block_type: BlockType,
    },
    SetBlockData {
        data: Map<String, Value>,
    },
    MergeBlockData {
        data: Map<String, Value>,
    },
    /// Create an entity and apply it to the selection; `null` clears entities.
    ApplyEntity {
        entity: Option<NewEntity>,
    },
    Undo,
    Redo,
    /// Fold an external text change into the model.
    Reconcile(SurfaceInput),
}

impl ScriptOp {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptOp::Select { .. } => "select",
            ScriptOp::InsertText { .. } => "insertText",
            ScriptOp::Backspace => "backspace",
            ScriptOp::Delete => "delete",
            ScriptOp::SplitBlock => "splitBlock",
            ScriptOp::ApplyInlineStyle { .. } => "applyInlineStyle",
            ScriptOp::RemoveInlineStyle { .. } => "removeInlineStyle",
            ScriptOp::SetBlockType { .. } => "setBlockType",
            ScriptOp::SetBlockData { .. } => "setBlockData",
            ScriptOp::MergeBlockData { .. } => "mergeBlockData",
            ScriptOp::ApplyEntity { .. } => "applyEntity",
            ScriptOp::Undo => "undo",
            ScriptOp::Redo => "redo",
            ScriptOp::Reconcile(_) => "reconcile",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptOptions {
    pub history: HistoryOptions,
    pub removal: RemovalOptions,
}

/// A script step failed. `step` is zero-based.
#[derive(Debug)]
pub enum ScriptError {
    UnsupportedVersion(u8),
    Step {
        step: usize,
        op: &'static str,
        source: EditorError,
    },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnsupportedVersion(v) => {
                write!(f, "Unsupported edit script version {v}. Supported versions: {SCRIPT_V}.")
            }
            ScriptError::Step { step, op, source } => {
                write!(f, "Edit script step {step} ({op}) failed: {source}")
            }
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScriptError::Step { source, .. } => Some(source),
            ScriptError::UnsupportedVersion(_) => None,
        }
    }
}

/// Replay `script` against `content` with a fresh history.
pub fn run_script(content: ContentState, script: &EditScript, opts: ScriptOptions) -> Result<EditorState, ScriptError> {
    let state = EditorState::create_with_content(content, None).with_history_options(opts.history);
    apply_script(state, script, opts)
}

/// Replay `script` on top of an existing editor state.
pub fn apply_script(state: EditorState, script: &EditScript, opts: ScriptOptions) -> Result<EditorState, ScriptError> {
    if script.v != SCRIPT_V {
        return Err(ScriptError::UnsupportedVersion(script.v));
    }
    let mut state = state;
    for (step, op) in script.ops.iter().enumerate() {
        state = apply_op(&state, op, opts).map_err(|source| ScriptError::Step {
            step,
            op: op.name(),
            source,
        })?;
        debug!(step, op = op.name(), change = ?state.last_change_type(), "script step");
    }
    info!(steps = script.ops.len(), "edit script applied");
    Ok(state)
}

fn checked_selection(content: &ContentState, selection: SelectionState) -> Result<SelectionState, ModelError> {
    for (key, offset) in [
        (&selection.anchor_key, selection.anchor_offset),
        (&selection.focus_key, selection.focus_offset),
    ] {
        let block = content.block_for_key(key)?;
        if offset > block.len() {
            return Err(ModelError::OffsetOutOfRange {
                key: key.clone(),
                offset,
                len: block.len(),
            });
        }
    }
    Ok(selection)
}

fn apply_op(state: &EditorState, op: &ScriptOp, opts: ScriptOptions) -> Result<EditorState, EditorError> {
    let content = state.current_content();
    let selection = state.selection();

    let next = match op {
        ScriptOp::Select {
            anchor_key,
            anchor_offset,
            focus_key,
            focus_offset,
        } => {
            let focus_key = focus_key.clone().unwrap_or_else(|| anchor_key.clone());
            let focus_offset = focus_offset.unwrap_or(*anchor_offset);
            let map = content.block_map();
            let is_backward = match (map.index_of(anchor_key), map.index_of(&focus_key)) {
                (Some(a), Some(f)) if a == f => focus_offset < *anchor_offset,
                (Some(a), Some(f)) => f < a,
                _ => false,
            };
            let requested = SelectionState {
                anchor_key: anchor_key.clone(),
                anchor_offset: *anchor_offset,
                focus_key,
                focus_offset,
                is_backward,
                has_focus: true,
            };
            state.force_selection(checked_selection(content, requested)?)
        }
        ScriptOp::InsertText { text, style } => {
            let style = match style {
                Some(names) => InlineStyle::of(names.iter().cloned()),
                None => state.current_inline_style(),
            };
            let updated = if selection.is_collapsed() {
                folio_modifier::insert_text(content, selection, text.as_str(), &style, None)?
            } else {
                folio_modifier::replace_text(content, selection, text.as_str(), &style, None)?
            };
            state.push(updated, ChangeType::InsertCharacters)
        }
        ScriptOp::Backspace => plain_backspace_with_options(state, opts.removal)?,
        ScriptOp::Delete => plain_delete_with_options(state, opts.removal)?,
        ScriptOp::SplitBlock => {
            let without_range =
                folio_modifier::remove_range_with_options(content, selection, RemovalDirection::Forward, opts.removal)?;
            let caret = if selection.is_collapsed() {
                selection.clone()
            } else {
                without_range.selection_after().clone()
            };
            let split = folio_modifier::split_block(&without_range, &caret)?;
            state.push(split, ChangeType::SplitBlock)
        }
        ScriptOp::ApplyInlineStyle { style } => {
            let updated = folio_modifier::apply_inline_style(content, selection, style)?;
            state.push(updated, ChangeType::ChangeInlineStyle)
        }
        ScriptOp::RemoveInlineStyle { style } => {
            let updated = folio_modifier::remove_inline_style(content, selection, style)?;
            state.push(updated, ChangeType::ChangeInlineStyle)
        }
        ScriptOp::SetBlockType { block_type } => {
            let updated = folio_modifier::set_block_type(content, selection, block_type.clone())?;
            state.push(updated, ChangeType::ChangeBlockType)
        }
        ScriptOp::SetBlockData { data } => {
            let updated = folio_modifier::set_block_data(content, selection, data)?;
            state.push(updated, ChangeType::ChangeBlockData)
        }
        ScriptOp::MergeBlockData { data } => {
            let updated = folio_modifier::merge_block_data(content, selection, data)?;
            state.push(updated, ChangeType::ChangeBlockData)
        }
        ScriptOp::ApplyEntity { entity } => {
            let (with_entity, key) = match entity {
                Some(e) => {
                    let (c, key) = content.create_entity(e.entity_type.clone(), e.mutability, e.data.clone());
                    (c, Some(key))
                }
                None => (content.clone(), None),
            };
            let updated = folio_modifier::apply_entity(&with_entity, selection, key)?;
            state.push(updated, ChangeType::ApplyEntity)
        }
        ScriptOp::Undo => state.undo(),
        ScriptOp::Redo => state.redo(),
        ScriptOp::Reconcile(input) => match reconcile_surface(state, input)? {
            SurfaceOutcome::Unchanged => state.clone(),
            SurfaceOutcome::Dispatched(next) | SurfaceOutcome::Updated(next) => next,
        },
    };
    Ok(next)
}
