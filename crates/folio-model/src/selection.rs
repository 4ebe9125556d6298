use serde::{Deserialize, Serialize};

use crate::block::BlockKey;

/// Anchor/focus pair of positions in block text (UTF-16 code-unit offsets).
///
/// When `is_backward` is false the anchor is the start of the range and the
/// focus its end; when true the roles are swapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub anchor_key: BlockKey,
    pub anchor_offset: usize,
    pub focus_key: BlockKey,
    pub focus_offset: usize,
    #[serde(default)]
    pub is_backward: bool,
    #[serde(default)]
    pub has_focus: bool,
}

impl SelectionState {
    /// Collapsed at the start of `key`, without focus.
    pub fn create_empty(key: impl Into<BlockKey>) -> Self {
        Self::collapsed_at(key, 0)
    }

    pub fn collapsed_at(key: impl Into<BlockKey>, offset: usize) -> Self {
        let key = key.into();
        Self {
            anchor_key: key.clone(),
            anchor_offset: offset,
            focus_key: key,
            focus_offset: offset,
            is_backward: false,
            has_focus: false,
        }
    }

    /// A forward range from `(start_key, start)` to `(end_key, end)`.
    pub fn range(
        start_key: impl Into<BlockKey>,
        start: usize,
        end_key: impl Into<BlockKey>,
        end: usize,
    ) -> Self {
        Self {
            anchor_key: start_key.into(),
            anchor_offset: start,
            focus_key: end_key.into(),
            focus_offset: end,
            is_backward: false,
            has_focus: false,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    pub fn start_key(&self) -> &str {
        if self.is_backward { &self.focus_key } else { &self.anchor_key }
    }

    pub fn start_offset(&self) -> usize {
        if self.is_backward { self.focus_offset } else { self.anchor_offset }
    }

    pub fn end_key(&self) -> &str {
        if self.is_backward { &self.anchor_key } else { &self.focus_key }
    }

    pub fn end_offset(&self) -> usize {
        if self.is_backward { self.anchor_offset } else { self.focus_offset }
    }

    /// The same range with anchor at the start and `is_backward` cleared.
    pub fn forward(&self) -> Self {
        Self {
            anchor_key: self.start_key().to_string(),
            anchor_offset: self.start_offset(),
            focus_key: self.end_key().to_string(),
            focus_offset: self.end_offset(),
            is_backward: false,
            has_focus: self.has_focus,
        }
    }

    /// Collapse onto `(key, offset)`, keeping focus state.
    pub fn collapse_to(&self, key: impl Into<BlockKey>, offset: usize) -> Self {
        Self {
            has_focus: self.has_focus,
            ..Self::collapsed_at(key, offset)
        }
    }

    /// Whether either edge lies in `key` within `[start, end]`.
    ///
    /// Only meaningful when both edges are in the same block; otherwise any
    /// edge in `key` counts.
    pub fn has_edge_within(&self, key: &str, start: usize, end: usize) -> bool {
        if self.anchor_key == self.focus_key && self.anchor_key == key {
            let (lo, hi) = (self.start_offset(), self.end_offset());
            return (start <= lo && lo <= end) || (start <= hi && hi <= end);
        }
        if key != self.anchor_key && key != self.focus_key {
            return false;
        }
        let offset = if key == self.anchor_key {
            self.anchor_offset
        } else {
            self.focus_offset
        };
        start <= offset && offset <= end
    }

    pub fn with_focus(mut self, has_focus: bool) -> Self {
        self.has_focus = has_focus;
        self
    }
}
