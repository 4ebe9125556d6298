//! Block type tags.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Semantic tag of a block.
///
/// Unknown tags survive round trips through [`BlockType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Unstyled,
    Paragraph,
    HeaderOne,
    HeaderTwo,
    HeaderThree,
    HeaderFour,
    HeaderFive,
    HeaderSix,
    UnorderedListItem,
    OrderedListItem,
    Blockquote,
    CodeBlock,
    Atomic,
    Custom(String),
}

impl Default for BlockType {
    fn default() -> Self {
        BlockType::Unstyled
    }
}

impl BlockType {
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Unstyled => "unstyled",
            BlockType::Paragraph => "paragraph",
            BlockType::HeaderOne => "header-one",
            BlockType::HeaderTwo => "header-two",
            BlockType::HeaderThree => "header-three",
            BlockType::HeaderFour => "header-four",
            BlockType::HeaderFive => "header-five",
            BlockType::HeaderSix => "header-six",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::OrderedListItem => "ordered-list-item",
            BlockType::Blockquote => "blockquote",
            BlockType::CodeBlock => "code-block",
            BlockType::Atomic => "atomic",
            BlockType::Custom(s) => s,
        }
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, BlockType::UnorderedListItem | BlockType::OrderedListItem)
    }

    pub fn is_header(&self) -> bool {
        matches!(
            self,
            BlockType::HeaderOne
                | BlockType::HeaderTwo
                | BlockType::HeaderThree
                | BlockType::HeaderFour
                | BlockType::HeaderFive
                | BlockType::HeaderSix
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            BlockType::Unstyled | BlockType::Paragraph => "Plain paragraph text",
            t if t.is_header() => "Section heading",
            t if t.is_list_item() => "List item, nested by depth",
            BlockType::Blockquote => "Quoted passage",
            BlockType::CodeBlock => "Preformatted code",
            BlockType::Atomic => "Single-entity media or embed block",
            _ => "Application-defined block type",
        }
    }
}

impl From<&str> for BlockType {
    fn from(s: &str) -> Self {
        match s {
            "unstyled" => BlockType::Unstyled,
            "paragraph" => BlockType::Paragraph,
            "header-one" => BlockType::HeaderOne,
            "header-two" => BlockType::HeaderTwo,
            "header-three" => BlockType::HeaderThree,
            "header-four" => BlockType::HeaderFour,
            "header-five" => BlockType::HeaderFive,
            "header-six" => BlockType::HeaderSix,
            "unordered-list-item" => BlockType::UnorderedListItem,
            "ordered-list-item" => BlockType::OrderedListItem,
            "blockquote" => BlockType::Blockquote,
            "code-block" => BlockType::CodeBlock,
            "atomic" => BlockType::Atomic,
            other => BlockType::Custom(other.to_string()),
        }
    }
}

impl From<String> for BlockType {
    fn from(s: String) -> Self {
        BlockType::from(s.as_str())
    }
}

impl From<BlockType> for String {
    fn from(t: BlockType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for tag in ["unstyled", "header-two", "ordered-list-item", "atomic", "callout"] {
            assert_eq!(BlockType::from(tag).as_str(), tag);
        }
        assert_eq!(BlockType::from("callout"), BlockType::Custom("callout".into()));
    }

    #[test]
    fn classification() {
        assert!(BlockType::OrderedListItem.is_list_item());
        assert!(BlockType::HeaderSix.is_header());
        assert_eq!(BlockType::CodeBlock.description(), "Preformatted code");
    }
}
