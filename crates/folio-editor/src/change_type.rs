use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tag recorded with every history entry.
///
/// Only history bookkeeping looks at it (typing coalescing, inline style
/// override reset); edit operations never branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    AdjustDepth,
    ApplyEntity,
    BackspaceCharacter,
    ChangeBlockData,
    ChangeBlockType,
    ChangeInlineStyle,
    DeleteCharacter,
    InsertCharacters,
    InsertFragment,
    MoveBlock,
    Redo,
    RemoveRange,
    SpellcheckChange,
    SplitBlock,
    Undo,
}

impl ChangeType {
    pub const ALL: [ChangeType; 15] = [
        ChangeType::AdjustDepth,
        ChangeType::ApplyEntity,
        ChangeType::BackspaceCharacter,
        ChangeType::ChangeBlockData,
        ChangeType::ChangeBlockType,
        ChangeType::ChangeInlineStyle,
        ChangeType::DeleteCharacter,
        ChangeType::InsertCharacters,
        ChangeType::InsertFragment,
        ChangeType::MoveBlock,
        ChangeType::Redo,
        ChangeType::RemoveRange,
        ChangeType::SpellcheckChange,
        ChangeType::SplitBlock,
        ChangeType::Undo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::AdjustDepth => "adjust-depth",
            ChangeType::ApplyEntity => "apply-entity",
            ChangeType::BackspaceCharacter => "backspace-character",
            ChangeType::ChangeBlockData => "change-block-data",
            ChangeType::ChangeBlockType => "change-block-type",
            ChangeType::ChangeInlineStyle => "change-inline-style",
            ChangeType::DeleteCharacter => "delete-character",
            ChangeType::InsertCharacters => "insert-characters",
            ChangeType::InsertFragment => "insert-fragment",
            ChangeType::MoveBlock => "move-block",
            ChangeType::Redo => "redo",
            ChangeType::RemoveRange => "remove-range",
            ChangeType::SpellcheckChange => "spellcheck-change",
            ChangeType::SplitBlock => "split-block",
            ChangeType::Undo => "undo",
        }
    }

    /// Single-character typing edits; consecutive ones may share an undo step.
    pub fn is_typing(self) -> bool {
        matches!(
            self,
            ChangeType::InsertCharacters | ChangeType::BackspaceCharacter | ChangeType::DeleteCharacter
        )
    }

    /// Change types after which an inline style override survives.
    pub fn keeps_style_override(self) -> bool {
        matches!(
            self,
            ChangeType::AdjustDepth | ChangeType::ChangeBlockType | ChangeType::SplitBlock
        )
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangeType::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown change type {s:?}"))
    }
}
