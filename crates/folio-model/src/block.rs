use std::ops::Range;

use serde_json::{Map, Value};

use crate::block_type::BlockType;
use crate::character::{CharacterMetadata, InlineStyle, find_ranges};
use crate::entity::EntityKey;
use crate::error::ModelError;
use crate::text::Utf16Text;
use crate::Result;

/// A stable identifier for a block.
pub type BlockKey = String;

/// Parent, children and sibling references of a tree block.
///
/// All links are keys into the owning block map, never owning pointers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeLinks {
    pub parent: Option<BlockKey>,
    pub children: Vec<BlockKey>,
    pub prev_sibling: Option<BlockKey>,
    pub next_sibling: Option<BlockKey>,
}

/// Whether a block lives in a flat list or in a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockShape {
    #[default]
    Flat,
    Tree(TreeLinks),
}

/// A single unit of document structure.
///
/// `characters` always has exactly one entry per UTF-16 code unit of `text`;
/// every constructor that accepts both checks it.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    key: BlockKey,
    block_type: BlockType,
    text: Utf16Text,
    characters: Vec<CharacterMetadata>,
    depth: u32,
    data: Map<String, Value>,
    shape: BlockShape,
}

impl Block {
    /// A flat block whose characters carry no style and no entity.
    pub fn new(key: impl Into<BlockKey>, block_type: BlockType, text: impl Into<Utf16Text>) -> Self {
        let text = text.into();
        let characters = vec![CharacterMetadata::empty(); text.len()];
        Self {
            key: key.into(),
            block_type,
            text,
            characters,
            depth: 0,
            data: Map::new(),
            shape: BlockShape::Flat,
        }
    }

    pub fn with_characters(
        key: impl Into<BlockKey>,
        block_type: BlockType,
        text: impl Into<Utf16Text>,
        characters: Vec<CharacterMetadata>,
    ) -> Result<Self> {
        let block = Self::new(key, block_type, Utf16Text::new());
        block.with_content(text.into(), characters)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn block_type(&self) -> &BlockType {
        &self.block_type
    }

    pub fn text(&self) -> &Utf16Text {
        &self.text
    }

    pub fn characters(&self) -> &[CharacterMetadata] {
        &self.characters
    }

    /// Length of the text in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn shape(&self) -> &BlockShape {
        &self.shape
    }

    pub fn is_tree(&self) -> bool {
        matches!(self.shape, BlockShape::Tree(_))
    }

    pub fn links(&self) -> Option<&TreeLinks> {
        match &self.shape {
            BlockShape::Tree(links) => Some(links),
            BlockShape::Flat => None,
        }
    }

    pub fn parent_key(&self) -> Option<&str> {
        self.links().and_then(|l| l.parent.as_deref())
    }

    pub fn child_keys(&self) -> &[BlockKey] {
        self.links().map(|l| l.children.as_slice()).unwrap_or(&[])
    }

    pub fn prev_sibling_key(&self) -> Option<&str> {
        self.links().and_then(|l| l.prev_sibling.as_deref())
    }

    pub fn next_sibling_key(&self) -> Option<&str> {
        self.links().and_then(|l| l.next_sibling.as_deref())
    }

    /// A block with no children. Flat blocks are always leaves.
    pub fn is_leaf(&self) -> bool {
        self.child_keys().is_empty()
    }

    pub fn entity_at(&self, offset: usize) -> Option<EntityKey> {
        self.characters.get(offset).and_then(CharacterMetadata::entity)
    }

    /// Style of the character at `offset`; empty past the end.
    pub fn inline_style_at(&self, offset: usize) -> InlineStyle {
        self.characters
            .get(offset)
            .map(|c| c.style().clone())
            .unwrap_or_default()
    }

    /// Maximal runs of equal entity that satisfy `filter`.
    pub fn find_entity_ranges(&self, filter: impl Fn(Option<EntityKey>) -> bool) -> Vec<Range<usize>> {
        find_ranges(
            &self.characters,
            |a, b| a.entity() == b.entity(),
            |c| filter(c.entity()),
        )
    }

    /// Maximal runs of equal inline style that satisfy `filter`.
    pub fn find_style_ranges(&self, filter: impl Fn(&InlineStyle) -> bool) -> Vec<Range<usize>> {
        find_ranges(
            &self.characters,
            |a, b| a.style() == b.style(),
            |c| filter(c.style()),
        )
    }

    /// Ranges covered by `entity`, in text order.
    pub fn ranges_for_entity(&self, entity: EntityKey) -> Vec<Range<usize>> {
        self.find_entity_ranges(|e| e == Some(entity))
    }

    /// Replace text and characters together.
    pub fn with_content(&self, text: Utf16Text, characters: Vec<CharacterMetadata>) -> Result<Self> {
        if characters.len() != text.len() {
            return Err(ModelError::CharacterListMismatch {
                key: self.key.clone(),
                characters: characters.len(),
                text_len: text.len(),
            });
        }
        Ok(Self {
            text,
            characters,
            ..self.clone_header()
        })
    }

    /// Replace the characters, keeping the text.
    pub fn with_character_list(&self, characters: Vec<CharacterMetadata>) -> Result<Self> {
        self.with_content(self.text.clone(), characters)
    }

    pub fn with_key(mut self, key: impl Into<BlockKey>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_type(mut self, block_type: BlockType) -> Self {
        self.block_type = block_type;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_shape(mut self, shape: BlockShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_links(self, links: TreeLinks) -> Self {
        self.with_shape(BlockShape::Tree(links))
    }

    // Everything except text and characters, which callers replace together.
    fn clone_header(&self) -> Self {
        Self {
            key: self.key.clone(),
            block_type: self.block_type.clone(),
            text: Utf16Text::new(),
            characters: Vec::new(),
            depth: self.depth,
            data: self.data.clone(),
            shape: self.shape.clone(),
        }
    }
}
