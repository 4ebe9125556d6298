use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::block::{Block, BlockKey};
use crate::block_map::BlockMap;
use crate::block_type::BlockType;
use crate::entity::{EntityInstance, EntityKey, EntityMap, Mutability};
use crate::error::ModelError;
use crate::selection::SelectionState;
use crate::Result;

/// One immutable document snapshot.
///
/// `selection_before` is the selection to restore when undoing into the state
/// that preceded this snapshot; `selection_after` is the selection that the
/// edit producing this snapshot left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentState {
    block_map: BlockMap,
    entity_map: EntityMap,
    selection_before: SelectionState,
    selection_after: SelectionState,
}

/// A selection validated against a snapshot, with edges in document order.
#[derive(Debug, Clone)]
pub struct ResolvedRange<'a> {
    pub start_block: &'a Arc<Block>,
    pub start_offset: usize,
    pub end_block: &'a Arc<Block>,
    pub end_offset: usize,
}

impl ResolvedRange<'_> {
    pub fn is_single_block(&self) -> bool {
        self.start_block.key() == self.end_block.key()
    }

    pub fn is_collapsed(&self) -> bool {
        self.is_single_block() && self.start_offset == self.end_offset
    }
}

/// Key of the `index`-th block produced by the text constructors.
pub fn default_block_key(index: usize) -> BlockKey {
    format!("b{index}")
}

impl ContentState {
    /// Wrap a block map and entity map. Both selections start collapsed at
    /// the beginning of the first block.
    pub fn new(block_map: BlockMap, entity_map: EntityMap) -> Self {
        let selection = block_map
            .first()
            .map(|b| SelectionState::create_empty(b.key()))
            .unwrap_or_default();
        Self {
            block_map,
            entity_map,
            selection_before: selection.clone(),
            selection_after: selection,
        }
    }

    /// One unstyled block per line of `text`.
    pub fn create_from_text(text: &str) -> Self {
        Self::create_from_text_with_delimiter(text, "\n")
    }

    pub fn create_from_text_with_delimiter(text: &str, delimiter: &str) -> Self {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let lines: Vec<&str> = if delimiter.is_empty() {
            vec![normalized.as_str()]
        } else {
            normalized.split(delimiter).collect()
        };
        let blocks: Vec<Arc<Block>> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| Arc::new(Block::new(default_block_key(i), BlockType::Unstyled, *line)))
            .collect();
        // Generated keys are unique by construction.
        let block_map = BlockMap::from_shared(blocks).unwrap_or_default();
        Self::new(block_map, EntityMap::new())
    }

    pub fn create_from_block_array(blocks: Vec<Block>, entity_map: EntityMap) -> Result<Self> {
        Ok(Self::new(BlockMap::create_from_array(blocks)?, entity_map))
    }

    pub fn block_map(&self) -> &BlockMap {
        &self.block_map
    }

    pub fn entity_map(&self) -> &EntityMap {
        &self.entity_map
    }

    pub fn selection_before(&self) -> &SelectionState {
        &self.selection_before
    }

    pub fn selection_after(&self) -> &SelectionState {
        &self.selection_after
    }

    pub fn with_block_map(mut self, block_map: BlockMap) -> Self {
        self.block_map = block_map;
        self
    }

    pub fn with_entity_map(mut self, entity_map: EntityMap) -> Self {
        self.entity_map = entity_map;
        self
    }

    pub fn with_selection_before(mut self, selection: SelectionState) -> Self {
        self.selection_before = selection;
        self
    }

    pub fn with_selection_after(mut self, selection: SelectionState) -> Self {
        self.selection_after = selection;
        self
    }

    /// Look up a block. A missing key is an invariant violation.
    pub fn block_for_key(&self, key: &str) -> Result<&Arc<Block>> {
        self.block_map
            .get(key)
            .ok_or_else(|| ModelError::UnknownBlock(key.to_string()))
    }

    pub fn get_block(&self, key: &str) -> Option<&Arc<Block>> {
        self.block_map.get(key)
    }

    pub fn key_before(&self, key: &str) -> Option<&str> {
        self.block_map.key_before(key)
    }

    pub fn key_after(&self, key: &str) -> Option<&str> {
        self.block_map.key_after(key)
    }

    pub fn block_before(&self, key: &str) -> Option<&Arc<Block>> {
        self.key_before(key).and_then(|k| self.block_map.get(k))
    }

    pub fn block_after(&self, key: &str) -> Option<&Arc<Block>> {
        self.key_after(key).and_then(|k| self.block_map.get(k))
    }

    pub fn first_block(&self) -> Option<&Arc<Block>> {
        self.block_map.first()
    }

    pub fn last_block(&self) -> Option<&Arc<Block>> {
        self.block_map.last()
    }

    pub fn blocks_as_array(&self) -> Vec<Arc<Block>> {
        self.block_map.blocks().cloned().collect()
    }

    pub fn is_tree(&self) -> bool {
        self.block_map.is_tree()
    }

    /// Block texts joined by `delimiter`.
    pub fn plain_text(&self, delimiter: &str) -> String {
        self.block_map
            .blocks()
            .map(|b| b.text().to_string_lossy())
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    pub fn has_text(&self) -> bool {
        let mut blocks = self.block_map.blocks();
        match (blocks.next(), blocks.next()) {
            (None, _) => false,
            (Some(first), None) => !first.is_empty(),
            (Some(_), Some(_)) => true,
        }
    }

    pub fn entity(&self, key: EntityKey) -> Result<&EntityInstance> {
        self.entity_map.get(key)
    }

    /// Add an entity and return the new snapshot with its key.
    pub fn create_entity(
        &self,
        entity_type: impl Into<String>,
        mutability: Mutability,
        data: Value,
    ) -> (Self, EntityKey) {
        let (entity_map, key) = self.entity_map.create(entity_type, mutability, data);
        debug!(entity = %key, %mutability, "created entity");
        (self.clone().with_entity_map(entity_map), key)
    }

    pub fn merge_entity_data(&self, key: EntityKey, data: Map<String, Value>) -> Result<Self> {
        let entity_map = self.entity_map.merge_data(key, data)?;
        Ok(self.clone().with_entity_map(entity_map))
    }

    pub fn replace_entity_data(&self, key: EntityKey, data: Value) -> Result<Self> {
        let entity_map = self.entity_map.replace_data(key, data)?;
        Ok(self.clone().with_entity_map(entity_map))
    }

    /// Same snapshot: shared block and entity storage and equal selections.
    pub fn is_same(&self, other: &ContentState) -> bool {
        self.block_map.same_storage(&other.block_map)
            && self.entity_map.same_storage(&other.entity_map)
            && self.selection_before == other.selection_before
            && self.selection_after == other.selection_after
    }

    /// Validate `selection` against this snapshot and order its edges.
    ///
    /// Fails when a key is unknown, an offset exceeds its block's length, or
    /// the normalized start lies after the end.
    pub fn resolve(&self, selection: &SelectionState) -> Result<ResolvedRange<'_>> {
        let start_block = self.block_for_key(selection.start_key())?;
        let end_block = self.block_for_key(selection.end_key())?;
        let start_offset = selection.start_offset();
        let end_offset = selection.end_offset();

        for (block, offset) in [(start_block, start_offset), (end_block, end_offset)] {
            if offset > block.len() {
                return Err(ModelError::OffsetOutOfRange {
                    key: block.key().to_string(),
                    offset,
                    len: block.len(),
                });
            }
        }

        let start_idx = self.block_map.index_of(start_block.key());
        let end_idx = self.block_map.index_of(end_block.key());
        let inverted = match start_idx.cmp(&end_idx) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => start_offset > end_offset,
            std::cmp::Ordering::Less => false,
        };
        if inverted {
            return Err(ModelError::InvertedRange {
                start_key: start_block.key().to_string(),
                start_offset,
                end_key: end_block.key().to_string(),
                end_offset,
            });
        }

        Ok(ResolvedRange {
            start_block,
            start_offset,
            end_block,
            end_offset,
        })
    }
}
