//! Ordered block storage.
//!
//! A `BlockMap` owns the block identity of one snapshot. Blocks are held
//! behind `Arc`, so a map derived from another reuses every block it did not
//! replace, and equality checks on untouched blocks reduce to pointer
//! comparisons.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::block::{Block, BlockKey, TreeLinks};
use crate::error::ModelError;
use crate::Result;

/// Ordered mapping from block key to block. Insertion order is document order.
#[derive(Debug, Clone, Default)]
pub struct BlockMap(Arc<IndexMap<BlockKey, Arc<Block>>>);

/// Child lists from which a tree-shaped map can be rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeLayout {
    pub roots: Vec<BlockKey>,
    pub children: HashMap<BlockKey, Vec<BlockKey>>,
}

impl TreeLayout {
    pub fn children_of(&self, key: &str) -> &[BlockKey] {
        self.children.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Child list of `parent`, or the root list when `parent` is `None`.
    pub fn siblings_mut(&mut self, parent: Option<&str>) -> &mut Vec<BlockKey> {
        match parent {
            Some(p) => self.children.entry(p.to_string()).or_default(),
            None => &mut self.roots,
        }
    }
}

impl BlockMap {
    /// Build a map from blocks in order. Keys must be unique.
    pub fn create_from_array(blocks: impl IntoIterator<Item = Block>) -> Result<Self> {
        Self::from_shared(blocks.into_iter().map(Arc::new))
    }

    pub fn from_shared(blocks: impl IntoIterator<Item = Arc<Block>>) -> Result<Self> {
        let mut map = IndexMap::new();
        for block in blocks {
            let key = block.key().to_string();
            if map.contains_key(&key) {
                return Err(ModelError::DuplicateBlock(key));
            }
            map.insert(key, block);
        }
        Ok(Self(Arc::new(map)))
    }

    pub fn get(&self, key: &str) -> Option<&Arc<Block>> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.0.get_index_of(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &BlockKey> {
        self.0.keys()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.0.values()
    }

    pub fn first(&self) -> Option<&Arc<Block>> {
        self.0.first().map(|(_, b)| b)
    }

    pub fn last(&self) -> Option<&Arc<Block>> {
        self.0.last().map(|(_, b)| b)
    }

    /// Key of the block preceding `key` in map order.
    pub fn key_before(&self, key: &str) -> Option<&str> {
        let idx = self.index_of(key)?;
        let before = idx.checked_sub(1)?;
        self.0.get_index(before).map(|(k, _)| k.as_str())
    }

    /// Key of the block following `key` in map order.
    pub fn key_after(&self, key: &str) -> Option<&str> {
        let idx = self.index_of(key)?;
        self.0.get_index(idx + 1).map(|(k, _)| k.as_str())
    }

    /// Blocks from `start` through `end` inclusive, in map order.
    pub fn range(&self, start: &str, end: &str) -> Result<Vec<&Arc<Block>>> {
        let from = self
            .index_of(start)
            .ok_or_else(|| ModelError::UnknownBlock(start.to_string()))?;
        let to = self
            .index_of(end)
            .ok_or_else(|| ModelError::UnknownBlock(end.to_string()))?;
        Ok(self
            .0
            .values()
            .skip(from)
            .take(to.saturating_sub(from) + 1)
            .collect())
    }

    /// Replace the contiguous run `start..=end` with `blocks`, keeping the
    /// blocks outside the run in place.
    pub fn replace_run(&self, start: &str, end: &str, blocks: Vec<Block>) -> Result<Self> {
        let from = self
            .index_of(start)
            .ok_or_else(|| ModelError::UnknownBlock(start.to_string()))?;
        let to = self
            .index_of(end)
            .ok_or_else(|| ModelError::UnknownBlock(end.to_string()))?;
        let mut out = Vec::with_capacity(self.len() + blocks.len());
        out.extend(self.blocks().take(from).cloned());
        out.extend(blocks.into_iter().map(Arc::new));
        out.extend(self.blocks().skip(to.max(from) + 1).cloned());
        Self::from_shared(out)
    }

    /// Nearest leaf after `key` in map order.
    pub fn next_leaf(&self, key: &str) -> Option<&Arc<Block>> {
        let idx = self.index_of(key)?;
        self.blocks().skip(idx + 1).find(|b| b.is_leaf())
    }

    /// Nearest leaf before `key` in map order.
    pub fn prev_leaf(&self, key: &str) -> Option<&Arc<Block>> {
        let idx = self.index_of(key)?;
        self.blocks().take(idx).filter(|b| b.is_leaf()).last()
    }

    /// Replace blocks that already exist, keeping their positions.
    pub fn with_blocks(&self, blocks: impl IntoIterator<Item = Block>) -> Result<Self> {
        let mut map = (*self.0).clone();
        for block in blocks {
            let key = block.key().to_string();
            match map.get_mut(&key) {
                Some(slot) => *slot = Arc::new(block),
                None => return Err(ModelError::UnknownBlock(key)),
            }
        }
        Ok(Self(Arc::new(map)))
    }

    pub fn with_block(&self, block: Block) -> Result<Self> {
        self.with_blocks([block])
    }

    /// Insert `block` directly after `after` in map order.
    pub fn insert_after(&self, after: &str, block: Block) -> Result<Self> {
        let idx = self
            .index_of(after)
            .ok_or_else(|| ModelError::UnknownBlock(after.to_string()))?;
        let key = block.key().to_string();
        if self.contains_key(&key) {
            return Err(ModelError::DuplicateBlock(key));
        }
        let mut map = (*self.0).clone();
        map.shift_insert(idx + 1, key, Arc::new(block));
        Ok(Self(Arc::new(map)))
    }

    /// Drop every block whose key is in `keys`.
    pub fn without(&self, keys: &HashSet<BlockKey>) -> Self {
        let mut map = (*self.0).clone();
        map.retain(|k, _| !keys.contains(k));
        Self(Arc::new(map))
    }

    /// Keys of the parent chain of `key`, nearest first.
    pub fn ancestors(&self, key: &str) -> Vec<BlockKey> {
        let mut out = Vec::new();
        let mut current = self.get(key).and_then(|b| b.parent_key().map(str::to_string));
        while let Some(parent) = current {
            if out.contains(&parent) {
                break;
            }
            current = self.get(&parent).and_then(|b| b.parent_key().map(str::to_string));
            out.push(parent);
        }
        out
    }

    /// Whether blocks carry tree links. Decided by the first block.
    pub fn is_tree(&self) -> bool {
        self.first().is_some_and(|b| b.is_tree())
    }

    /// A key derived from `base` that is not in the map:
    /// `<base>_<suffix>`, then `<base>_<suffix>2`, `<base>_<suffix>3`, ...
    pub fn unique_key(&self, base: &str, suffix: &str) -> BlockKey {
        let first = format!("{base}_{suffix}");
        if !self.contains_key(&first) {
            return first;
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{first}{n}");
            if !self.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// True when both maps share the same storage.
    pub fn same_storage(&self, other: &BlockMap) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Current child lists. Roots are the parentless blocks in map order.
    pub fn tree_layout(&self) -> TreeLayout {
        let mut layout = TreeLayout::default();
        for block in self.blocks() {
            if block.parent_key().is_none() {
                layout.roots.push(block.key().to_string());
            }
            if !block.child_keys().is_empty() {
                layout
                    .children
                    .insert(block.key().to_string(), block.child_keys().to_vec());
            }
        }
        layout
    }

    /// Rebuild a tree-shaped map from `layout`, taking block values from
    /// `self` and `extra`.
    ///
    /// Map order becomes the pre-order walk of the layout. Parent, children
    /// and sibling links are recomputed together; blocks whose links did not
    /// change are reused as-is. Blocks the layout does not reach are dropped.
    pub fn relinked(&self, extra: &[Block], layout: &TreeLayout) -> Result<Self> {
        let pool: HashMap<&str, &Block> = extra.iter().map(|b| (b.key(), b)).collect();
        let mut map: IndexMap<BlockKey, Arc<Block>> = IndexMap::with_capacity(self.len() + extra.len());

        // Pushed in reverse so siblings pop in order.
        let mut stack: Vec<Pending> = Vec::new();
        push_siblings(&mut stack, None, &layout.roots);

        while let Some((key, parent, siblings, idx)) = stack.pop() {
            if map.contains_key(&key) {
                return Err(ModelError::DuplicateBlock(key));
            }
            let expected = TreeLinks {
                parent: parent.clone(),
                children: layout.children_of(&key).to_vec(),
                prev_sibling: idx.checked_sub(1).map(|i| siblings[i].clone()),
                next_sibling: siblings.get(idx + 1).cloned(),
            };
            let block = match pool.get(key.as_str()) {
                Some(b) => Arc::new((*b).clone().with_links(expected)),
                None => {
                    let existing = self
                        .get(&key)
                        .ok_or_else(|| ModelError::UnknownBlock(key.clone()))?;
                    if existing.links() == Some(&expected) {
                        Arc::clone(existing)
                    } else {
                        Arc::new(existing.as_ref().clone().with_links(expected))
                    }
                }
            };
            map.insert(key.clone(), block);
            push_siblings(&mut stack, Some(key.clone()), layout.children_of(&key));
        }

        Ok(Self(Arc::new(map)))
    }
}

// (key, parent, sibling list, index in sibling list)
type Pending = (BlockKey, Option<BlockKey>, Arc<[BlockKey]>, usize);

fn push_siblings(stack: &mut Vec<Pending>, parent: Option<BlockKey>, siblings: &[BlockKey]) {
    let shared: Arc<[BlockKey]> = siblings.into();
    for (idx, key) in siblings.iter().enumerate().rev() {
        stack.push((key.clone(), parent.clone(), Arc::clone(&shared), idx));
    }
}

impl PartialEq for BlockMap {
    fn eq(&self, other: &Self) -> bool {
        if self.same_storage(other) {
            return true;
        }
        self.len() == other.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|((ka, a), (kb, b))| ka == kb && (Arc::ptr_eq(a, b) || a == b))
    }
}
