//! Pure edit operations over content snapshots.
//!
//! Every function takes a snapshot and a selection and returns a new
//! snapshot; the input is never changed. Blocks an operation does not touch
//! are shared with the input.

use serde_json::{Map, Value};
use tracing::debug;

use folio_model::{
    Block, BlockType, CharacterMetadata, ContentState, EntityKey, InlineStyle, ModelError, Result,
    SelectionState, Utf16Text,
};

use crate::edges::remove_entities_at_edges;
use crate::options::{RemovalDirection, RemovalOptions};
use crate::removal::character_removal_range_with_options;
use crate::tree;

/// Insert `text` at a collapsed selection. Inserted characters carry `style`
/// and `entity`; the cursor ends up after the inserted text.
///
/// Inserting inside a non-mutable entity strips that entity first.
pub fn insert_text(
    content: &ContentState,
    selection: &SelectionState,
    text: impl Into<Utf16Text>,
    style: &InlineStyle,
    entity: Option<EntityKey>,
) -> Result<ContentState> {
    let text = text.into();
    let metadata = CharacterMetadata::create(style.clone(), entity);
    if text.is_empty() {
        return insert_text_into_content(content, selection, &text, metadata);
    }
    let without_entities = remove_entities_at_edges(content, selection)?;
    insert_text_into_content(&without_entities, selection, &text, metadata)
}

/// Replace the selected range with `text`.
///
/// Non-mutable entities cut at either edge lose their key first, then the
/// literal range is removed and `text` inserted at its start.
pub fn replace_text(
    content: &ContentState,
    selection: &SelectionState,
    text: impl Into<Utf16Text>,
    style: &InlineStyle,
    entity: Option<EntityKey>,
) -> Result<ContentState> {
    let without_entities = remove_entities_at_edges(content, selection)?;
    let without_text = remove_range_from_content(&without_entities, selection)?;
    let insertion = without_text.selection_after().clone();
    let metadata = CharacterMetadata::create(style.clone(), entity);
    insert_text_into_content(&without_text, &insertion, &text.into(), metadata)
}

/// Delete the selected range, widening it first to respect entity
/// mutability. A collapsed selection removes nothing.
pub fn remove_range(
    content: &ContentState,
    selection: &SelectionState,
    direction: RemovalDirection,
) -> Result<ContentState> {
    remove_range_with_options(content, selection, direction, RemovalOptions::default())
}

pub fn remove_range_with_options(
    content: &ContentState,
    selection: &SelectionState,
    direction: RemovalDirection,
    opts: RemovalOptions,
) -> Result<ContentState> {
    let resolved = content.resolve(selection)?;
    if resolved.is_collapsed() {
        return Ok(content.clone());
    }
    let target = character_removal_range_with_options(
        content.entity_map(),
        resolved.start_block,
        resolved.end_block,
        selection,
        direction,
        opts,
    )?;
    remove_range_from_content(content, &target)
}

/// Split the block at a collapsed selection.
///
/// The right half gets a new key derived from the original
/// (`<key>_split`, `<key>_split2`, ...), starts with empty block data and
/// becomes the next sibling in tree content. An empty list item is turned into
/// an unstyled block instead of being split. A non-mutable entity around the
/// split point loses its key on both halves.
pub fn split_block(content: &ContentState, selection: &SelectionState) -> Result<ContentState> {
    if !selection.is_collapsed() {
        return Err(ModelError::SelectionNotCollapsed {
            operation: "split_block",
        });
    }
    let content = &remove_entities_at_edges(content, selection)?;
    let resolved = content.resolve(selection)?;
    let block = resolved.start_block;
    let offset = resolved.start_offset;
    let map = content.block_map();

    if block.is_empty() && block.block_type().is_list_item() {
        debug!(key = %block.key(), "empty list item becomes unstyled");
        let updated = block.as_ref().clone().with_type(BlockType::Unstyled).with_depth(0);
        return Ok(content
            .clone()
            .with_block_map(map.with_block(updated)?)
            .with_selection_before(selection.clone())
            .with_selection_after(selection.clone()));
    }

    let key_below = map.unique_key(block.key(), "split");
    let text = block.text();
    let chars = block.characters();
    let above = block.with_content(text.slice(0..offset), chars[..offset].to_vec())?;
    let below = block
        .with_content(text.slice(offset..text.len()), chars[offset..].to_vec())?
        .with_key(key_below.clone())
        .with_data(Map::new());
    debug!(key = %block.key(), offset, new_key = %key_below, "split_block");

    let block_map = if content.is_tree() {
        tree::split_relinked(map, above, below)?
    } else {
        map.with_block(above)?.insert_after(block.key(), below)?
    };
    let after = selection.collapse_to(key_below, 0);
    Ok(content
        .clone()
        .with_block_map(block_map)
        .with_selection_before(selection.clone())
        .with_selection_after(after))
}

/// Set (or with `None`, clear) the entity of every selected character.
pub fn apply_entity(
    content: &ContentState,
    selection: &SelectionState,
    entity: Option<EntityKey>,
) -> Result<ContentState> {
    if let Some(key) = entity {
        content.entity(key)?;
    }
    let without_entities = remove_entities_at_edges(content, selection)?;
    map_characters(&without_entities, selection, |c| c.apply_entity(entity))
}

pub fn apply_inline_style(content: &ContentState, selection: &SelectionState, style: &str) -> Result<ContentState> {
    map_characters(content, selection, |c| c.apply_style(style))
}

pub fn remove_inline_style(content: &ContentState, selection: &SelectionState, style: &str) -> Result<ContentState> {
    map_characters(content, selection, |c| c.remove_style(style))
}

/// Set the type of every block the selection touches.
pub fn set_block_type(content: &ContentState, selection: &SelectionState, block_type: BlockType) -> Result<ContentState> {
    map_blocks(content, selection, |b| b.clone().with_type(block_type.clone()))
}

/// Replace the block data of every block the selection touches.
pub fn set_block_data(
    content: &ContentState,
    selection: &SelectionState,
    data: &Map<String, Value>,
) -> Result<ContentState> {
    map_blocks(content, selection, |b| b.clone().with_data(data.clone()))
}

/// Shallow-merge `data` into the block data of every touched block.
pub fn merge_block_data(
    content: &ContentState,
    selection: &SelectionState,
    data: &Map<String, Value>,
) -> Result<ContentState> {
    map_blocks(content, selection, |b| {
        let mut merged = b.data().clone();
        merged.extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        b.clone().with_data(merged)
    })
}

fn insert_text_into_content(
    content: &ContentState,
    selection: &SelectionState,
    text: &Utf16Text,
    metadata: CharacterMetadata,
) -> Result<ContentState> {
    if !selection.is_collapsed() {
        return Err(ModelError::SelectionNotCollapsed {
            operation: "insert_text",
        });
    }
    let resolved = content.resolve(selection)?;
    if text.is_empty() {
        return Ok(content.clone());
    }
    let block = resolved.start_block;
    let offset = resolved.start_offset;
    debug!(key = %block.key(), offset, len = text.len(), "insert_text");

    let new_text = block.text().splice(offset..offset, text);
    let mut chars = block.characters().to_vec();
    chars.splice(offset..offset, std::iter::repeat_n(metadata, text.len()));
    let updated = block.with_content(new_text, chars)?;

    let after = selection.collapse_to(block.key(), offset + text.len());
    Ok(content
        .clone()
        .with_block_map(content.block_map().with_block(updated)?)
        .with_selection_after(after))
}

/// Delete exactly `range`, merging its end block into its start block.
fn remove_range_from_content(content: &ContentState, range: &SelectionState) -> Result<ContentState> {
    let resolved = content.resolve(range)?;
    if resolved.is_collapsed() {
        return Ok(content.clone());
    }
    let start = resolved.start_block;
    let end = resolved.end_block;
    let (start_offset, end_offset) = (resolved.start_offset, resolved.end_offset);
    debug!(
        start_key = %start.key(),
        start_offset,
        end_key = %end.key(),
        end_offset,
        "remove_range"
    );

    let text = start
        .text()
        .slice(0..start_offset)
        .concat(&end.text().slice(end_offset..end.len()));
    let mut chars = start.characters()[..start_offset].to_vec();
    chars.extend_from_slice(&end.characters()[end_offset..]);
    let merged = start.with_content(text, chars)?;

    let map = content.block_map();
    let block_map = if resolved.is_single_block() {
        map.with_block(merged)?
    } else if content.is_tree() {
        tree::merge_relinked(map, merged, end.key())?
    } else {
        map.replace_run(start.key(), end.key(), vec![merged])?
    };

    let after = range.collapse_to(start.key(), start_offset);
    Ok(content
        .clone()
        .with_block_map(block_map)
        .with_selection_before(range.clone())
        .with_selection_after(after))
}

/// Rewrite the metadata of every selected character.
fn map_characters(
    content: &ContentState,
    selection: &SelectionState,
    f: impl Fn(&CharacterMetadata) -> CharacterMetadata,
) -> Result<ContentState> {
    let resolved = content.resolve(selection)?;
    let start_key = resolved.start_block.key();
    let end_key = resolved.end_block.key();
    let map = content.block_map();

    let mut updates = Vec::new();
    for block in map.range(start_key, end_key)? {
        let from = if block.key() == start_key { resolved.start_offset } else { 0 };
        let to = if block.key() == end_key { resolved.end_offset } else { block.len() };
        if from >= to {
            continue;
        }
        let mut chars = block.characters().to_vec();
        for c in &mut chars[from..to] {
            *c = f(c);
        }
        if chars != block.characters() {
            updates.push(block.with_character_list(chars)?);
        }
    }
    let block_map = if updates.is_empty() {
        map.clone()
    } else {
        map.with_blocks(updates)?
    };
    Ok(content
        .clone()
        .with_block_map(block_map)
        .with_selection_before(selection.clone())
        .with_selection_after(selection.clone()))
}

/// Rewrite every block from the selection's start block through its end block.
fn map_blocks(
    content: &ContentState,
    selection: &SelectionState,
    f: impl Fn(&Block) -> Block,
) -> Result<ContentState> {
    let resolved = content.resolve(selection)?;
    let map = content.block_map();
    let updates: Vec<Block> = map
        .range(resolved.start_block.key(), resolved.end_block.key())?
        .into_iter()
        .map(|b| f(b.as_ref()))
        .collect();
    Ok(content
        .clone()
        .with_block_map(map.with_blocks(updates)?)
        .with_selection_before(selection.clone())
        .with_selection_after(selection.clone()))
}
