//! Block map rebuilds for tree-shaped content.
//!
//! Both helpers edit a [`TreeLayout`] and hand it to
//! [`BlockMap::relinked`], which recomputes every parent, child and sibling
//! link in one pass.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use folio_model::{Block, BlockKey, BlockMap, ModelError, Result};

/// Map after folding the run `(start, end]` into `merged`, which carries the
/// start block's key.
///
/// The end block's children move to the end of the start block's child list.
/// Blocks inside the run are dropped unless they are still an ancestor of a
/// retained block.
pub fn merge_relinked(map: &BlockMap, merged: Block, end_key: &str) -> Result<BlockMap> {
    let start_key = merged.key().to_string();
    let from = map
        .index_of(&start_key)
        .ok_or_else(|| ModelError::UnknownBlock(start_key.clone()))?;
    let to = map
        .index_of(end_key)
        .ok_or_else(|| ModelError::UnknownBlock(end_key.to_string()))?;
    let run: HashSet<BlockKey> = map
        .keys()
        .skip(from + 1)
        .take(to.saturating_sub(from))
        .cloned()
        .collect();

    let mut layout = map.tree_layout();
    if let Some(orphans) = layout.children.remove(end_key) {
        layout.siblings_mut(Some(&start_key)).extend(orphans);
    }

    let parent_of: HashMap<&str, &str> = layout
        .children
        .iter()
        .flat_map(|(parent, children)| children.iter().map(move |c| (c.as_str(), parent.as_str())))
        .collect();
    let mut kept: HashSet<&str> = HashSet::new();
    for key in map.keys().filter(|k| !run.contains(*k)) {
        let mut current = parent_of.get(key.as_str()).copied();
        while let Some(parent) = current {
            if run.contains(parent) && !kept.insert(parent) {
                break;
            }
            current = parent_of.get(parent).copied();
        }
    }
    let dropped: HashSet<BlockKey> = run
        .iter()
        .filter(|k| !kept.contains(k.as_str()))
        .cloned()
        .collect();

    debug!(start = %start_key, end = end_key, dropped = dropped.len(), "merging tree blocks");

    layout.roots.retain(|k| !dropped.contains(k));
    layout.children.retain(|k, _| !dropped.contains(k));
    for children in layout.children.values_mut() {
        children.retain(|k| !dropped.contains(k));
    }
    map.relinked(&[merged], &layout)
}

/// Map after splitting a tree block into `above` (same key) and `below`
/// (new key), with `below` as the next sibling of `above`.
pub fn split_relinked(map: &BlockMap, above: Block, below: Block) -> Result<BlockMap> {
    let mut layout = map.tree_layout();
    let parent = above.parent_key().map(str::to_string);
    let siblings = layout.siblings_mut(parent.as_deref());
    let pos = siblings
        .iter()
        .position(|k| k == above.key())
        .ok_or_else(|| ModelError::UnknownBlock(above.key().to_string()))?;
    siblings.insert(pos + 1, below.key().to_string());
    map.relinked(&[above, below], &layout)
}
