//! Versioned editor state: the current snapshot, the user's selection and
//! two explicit history stacks.
//!
//! An `EditorState` is a value. Every operation returns a new state; the old
//! one stays valid and shares its snapshots with the new one.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use folio_model::{Block, BlockKey, ContentState, InlineStyle, SelectionState};

use crate::block_tree::BlockTree;
use crate::change_type::ChangeType;
use crate::decorator::Decorator;

pub const DEFAULT_MAX_UNDO_DEPTH: usize = 100;

/// History behaviour of an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryOptions {
    /// When false, pushes replace the content without recording history.
    pub allow_undo: bool,
    /// Oldest undo entries are dropped beyond this depth.
    pub max_depth: usize,
    /// Merge consecutive typing pushes of the same change type into one undo
    /// step while the selection follows the edits.
    pub coalesce_typing: bool,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            allow_undo: true,
            max_depth: DEFAULT_MAX_UNDO_DEPTH,
            coalesce_typing: false,
        }
    }
}

#[derive(Clone)]
struct CachedTree {
    block: Arc<Block>,
    tree: Arc<BlockTree>,
}

type TreeMap = Arc<HashMap<BlockKey, CachedTree>>;

#[derive(Clone)]
pub struct EditorState {
    current_content: ContentState,
    selection: SelectionState,
    undo_stack: VecDeque<ContentState>,
    redo_stack: Vec<ContentState>,
    last_change_type: Option<ChangeType>,
    force_selection: bool,
    inline_style_override: Option<InlineStyle>,
    decorator: Option<Arc<dyn Decorator>>,
    tree_map: TreeMap,
    history: HistoryOptions,
}

/// Block trees for `content`, reusing entries from `previous` whose block is
/// the same shared value.
fn regenerate_trees(content: &ContentState, decorator: Option<&dyn Decorator>, previous: Option<&TreeMap>) -> TreeMap {
    let mut rebuilt = 0usize;
    let map = content
        .block_map()
        .blocks()
        .map(|block| {
            let reused = previous
                .and_then(|p| p.get(block.key()))
                .filter(|cached| Arc::ptr_eq(&cached.block, block))
                .cloned();
            let cached = reused.unwrap_or_else(|| {
                rebuilt += 1;
                CachedTree {
                    block: Arc::clone(block),
                    tree: Arc::new(BlockTree::generate(content, block, decorator)),
                }
            });
            (block.key().to_string(), cached)
        })
        .collect();
    debug!(rebuilt, blocks = content.block_map().len(), "regenerated block trees");
    Arc::new(map)
}

impl EditorState {
    pub fn create_empty(decorator: Option<Arc<dyn Decorator>>) -> Self {
        Self::create_with_content(ContentState::create_from_text(""), decorator)
    }

    /// Wrap `content` with empty history and a cursor at the start of the
    /// first block.
    pub fn create_with_content(content: ContentState, decorator: Option<Arc<dyn Decorator>>) -> Self {
        let selection = content
            .first_block()
            .map(|b| SelectionState::create_empty(b.key()))
            .unwrap_or_default();
        let tree_map = regenerate_trees(&content, decorator.as_deref(), None);
        Self {
            current_content: content,
            selection,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            last_change_type: None,
            force_selection: false,
            inline_style_override: None,
            decorator,
            tree_map,
            history: HistoryOptions::default(),
        }
    }

    pub fn with_history_options(mut self, history: HistoryOptions) -> Self {
        self.history = history;
        while self.undo_stack.len() > history.max_depth {
            self.undo_stack.pop_front();
        }
        self
    }

    pub fn current_content(&self) -> &ContentState {
        &self.current_content
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Undo entries, oldest first.
    pub fn undo_stack(&self) -> impl Iterator<Item = &ContentState> {
        self.undo_stack.iter()
    }

    /// Redo entries, oldest first; the last one is redone next.
    pub fn redo_stack(&self) -> &[ContentState] {
        &self.redo_stack
    }

    pub fn can_undo(&self) -> bool {
        self.history.allow_undo && !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.history.allow_undo && !self.redo_stack.is_empty()
    }

    pub fn last_change_type(&self) -> Option<ChangeType> {
        self.last_change_type
    }

    /// Whether the surface must adopt `selection()` instead of reporting its own.
    pub fn must_force_selection(&self) -> bool {
        self.force_selection
    }

    pub fn history_options(&self) -> HistoryOptions {
        self.history
    }

    pub fn decorator(&self) -> Option<&Arc<dyn Decorator>> {
        self.decorator.as_ref()
    }

    pub fn inline_style_override(&self) -> Option<&InlineStyle> {
        self.inline_style_override.as_ref()
    }

    pub fn block_tree(&self, key: &str) -> Option<&BlockTree> {
        self.tree_map.get(key).map(|c| c.tree.as_ref())
    }

    /// Same content snapshot, selection and history position.
    pub fn is_same(&self, other: &EditorState) -> bool {
        self.current_content.is_same(&other.current_content)
            && self.selection == other.selection
            && self.undo_stack.len() == other.undo_stack.len()
            && self.redo_stack.len() == other.redo_stack.len()
            && self.last_change_type == other.last_change_type
    }

    /// Record `content` as the new current snapshot.
    ///
    /// Pushing the current snapshot again returns the state unchanged.
    /// Otherwise the previous snapshot goes onto the undo stack, the redo
    /// stack is cleared and the new snapshot's `selection_before` becomes the
    /// selection the edit started from.
    pub fn push(&self, content: ContentState, change_type: ChangeType) -> Self {
        self.push_inner(content, change_type, false)
    }

    pub(crate) fn push_inner(&self, content: ContentState, change_type: ChangeType, keep_selection_before: bool) -> Self {
        if content.is_same(&self.current_content) {
            return self.clone();
        }

        let inline_style_override = if change_type.keeps_style_override() {
            self.inline_style_override.clone()
        } else {
            None
        };
        let tree_map = regenerate_trees(&content, self.decorator.as_deref(), Some(&self.tree_map));
        let selection = content.selection_after().clone();

        if !self.history.allow_undo {
            debug!(change = %change_type, "push without history");
            return Self {
                current_content: content,
                selection,
                last_change_type: Some(change_type),
                force_selection: true,
                inline_style_override,
                tree_map,
                ..self.clone()
            };
        }

        let coalesce = self.history.coalesce_typing
            && change_type.is_typing()
            && self.last_change_type == Some(change_type)
            && self.selection == *self.current_content.selection_after();

        let mut undo_stack = self.undo_stack.clone();
        let content = if coalesce {
            // Extend the open typing step: undo returns to where it began.
            let before = self.current_content.selection_before().clone();
            content.with_selection_before(before)
        } else {
            undo_stack.push_back(self.current_content.clone());
            while undo_stack.len() > self.history.max_depth {
                undo_stack.pop_front();
            }
            if keep_selection_before {
                content
            } else {
                content.with_selection_before(self.selection.clone())
            }
        };

        debug!(change = %change_type, coalesce, undo_depth = undo_stack.len(), "push");
        Self {
            current_content: content,
            selection,
            undo_stack,
            redo_stack: Vec::new(),
            last_change_type: Some(change_type),
            force_selection: true,
            inline_style_override,
            decorator: self.decorator.clone(),
            tree_map,
            history: self.history,
        }
    }

    /// Step back one snapshot. The selection returns to where the undone
    /// edit started.
    pub fn undo(&self) -> Self {
        if !self.history.allow_undo {
            return self.clone();
        }
        let mut undo_stack = self.undo_stack.clone();
        let Some(previous) = undo_stack.pop_back() else {
            return self.clone();
        };
        let mut redo_stack = self.redo_stack.clone();
        redo_stack.push(self.current_content.clone());
        debug!(undo_depth = undo_stack.len(), redo_depth = redo_stack.len(), "undo");

        Self {
            tree_map: regenerate_trees(&previous, self.decorator.as_deref(), Some(&self.tree_map)),
            selection: self.current_content.selection_before().clone(),
            current_content: previous,
            undo_stack,
            redo_stack,
            last_change_type: Some(ChangeType::Undo),
            force_selection: true,
            inline_style_override: None,
            decorator: self.decorator.clone(),
            history: self.history,
        }
    }

    /// Re-apply the last undone snapshot, with the selection it produced.
    pub fn redo(&self) -> Self {
        if !self.history.allow_undo {
            return self.clone();
        }
        let mut redo_stack = self.redo_stack.clone();
        let Some(next) = redo_stack.pop() else {
            return self.clone();
        };
        let mut undo_stack = self.undo_stack.clone();
        undo_stack.push_back(self.current_content.clone());
        debug!(undo_depth = undo_stack.len(), redo_depth = redo_stack.len(), "redo");

        Self {
            tree_map: regenerate_trees(&next, self.decorator.as_deref(), Some(&self.tree_map)),
            selection: next.selection_after().clone(),
            current_content: next,
            undo_stack,
            redo_stack,
            last_change_type: Some(ChangeType::Redo),
            force_selection: true,
            inline_style_override: None,
            decorator: self.decorator.clone(),
            history: self.history,
        }
    }

    /// Set the selection and ask the surface to adopt it. The selection is
    /// marked focused.
    pub fn force_selection(&self, selection: SelectionState) -> Self {
        Self {
            selection: selection.with_focus(true),
            force_selection: true,
            inline_style_override: None,
            ..self.clone()
        }
    }

    /// Record a selection the surface already shows.
    pub fn accept_selection(&self, selection: SelectionState) -> Self {
        Self {
            selection,
            force_selection: false,
            inline_style_override: None,
            ..self.clone()
        }
    }

    pub fn set_decorator(&self, decorator: Option<Arc<dyn Decorator>>) -> Self {
        let tree_map = regenerate_trees(&self.current_content, decorator.as_deref(), None);
        Self {
            decorator,
            tree_map,
            ..self.clone()
        }
    }

    /// Style for the next typed character, overriding the one derived from
    /// the selection until a content change other than block type, depth or
    /// split.
    pub fn set_inline_style_override(&self, style: InlineStyle) -> Self {
        Self {
            inline_style_override: Some(style),
            ..self.clone()
        }
    }

    /// Style that typing at the selection would use.
    ///
    /// A collapsed cursor takes the style of the character before it (or the
    /// first character at offset 0); a range takes the style of its first
    /// character. Empty positions fall back to the last character of the
    /// nearest non-empty block above.
    pub fn current_inline_style(&self) -> InlineStyle {
        if let Some(style) = &self.inline_style_override {
            return style.clone();
        }
        let content = &self.current_content;
        let selection = &self.selection;
        let Some(block) = content.get_block(selection.start_key()) else {
            return InlineStyle::none();
        };
        let offset = selection.start_offset();

        if selection.is_collapsed() {
            if offset > 0 {
                return block.inline_style_at(offset - 1);
            }
            if !block.is_empty() {
                return block.inline_style_at(0);
            }
        } else {
            if offset < block.len() {
                return block.inline_style_at(offset);
            }
            if offset > 0 {
                return block.inline_style_at(offset - 1);
            }
        }

        let map = content.block_map();
        let index = map.index_of(block.key()).unwrap_or(0);
        map.blocks()
            .take(index)
            .filter(|b| !b.is_empty())
            .last()
            .map(|b| b.inline_style_at(b.len() - 1))
            .unwrap_or_default()
    }

    pub fn is_selection_at_start_of_content(&self) -> bool {
        self.current_content
            .first_block()
            .is_some_and(|first| self.selection.has_edge_within(first.key(), 0, 0))
    }

    pub fn is_selection_at_end_of_content(&self) -> bool {
        self.current_content
            .last_block()
            .is_some_and(|last| self.selection.has_edge_within(last.key(), last.len(), last.len()))
    }
}

impl fmt::Debug for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorState")
            .field("current_content", &self.current_content)
            .field("selection", &self.selection)
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("last_change_type", &self.last_change_type)
            .field("force_selection", &self.force_selection)
            .field("inline_style_override", &self.inline_style_override)
            .field("decorated", &self.decorator.is_some())
            .field("history", &self.history)
            .finish()
    }
}
