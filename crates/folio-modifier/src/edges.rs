use std::ops::Range;

use folio_model::{Block, CharacterMetadata, ContentState, EntityMap, ModelError, Mutability, Result, SelectionState};

/// Strip non-mutable entities that a cut at either edge of `selection` would
/// split in two.
///
/// When the characters on both sides of an edge carry the same `IMMUTABLE`
/// or `SEGMENTED` entity, the entity is removed from every character of that
/// run so neither half survives as a partial entity. Blocks that need no
/// change keep their identity.
pub fn remove_entities_at_edges(content: &ContentState, selection: &SelectionState) -> Result<ContentState> {
    let resolved = content.resolve(selection)?;
    let entity_map = content.entity_map();

    let start_key = resolved.start_block.key().to_string();
    let end_key = resolved.end_block.key().to_string();
    let end_offset = resolved.end_offset;

    let updated_start = remove_for_block(entity_map, resolved.start_block, resolved.start_offset)?;
    let mut updates = Vec::new();

    if start_key == end_key {
        let base = updated_start.as_ref().unwrap_or(&**resolved.start_block);
        match remove_for_block(entity_map, base, end_offset)? {
            Some(block) => updates.push(block),
            None => updates.extend(updated_start),
        }
    } else {
        let updated_end = remove_for_block(entity_map, resolved.end_block, end_offset)?;
        updates.extend(updated_start);
        updates.extend(updated_end);
    }

    let out = content.clone().with_selection_after(selection.clone());
    if updates.is_empty() {
        return Ok(out);
    }
    let block_map = content.block_map().with_blocks(updates)?;
    Ok(out.with_block_map(block_map))
}

fn remove_for_block(entity_map: &EntityMap, block: &Block, offset: usize) -> Result<Option<Block>> {
    let chars = block.characters();
    let before = offset.checked_sub(1).and_then(|i| chars.get(i)).and_then(CharacterMetadata::entity);
    let after = chars.get(offset).and_then(CharacterMetadata::entity);

    let Some(entity) = after.filter(|a| Some(*a) == before) else {
        return Ok(None);
    };
    if entity_map.get(entity)?.mutability == Mutability::Mutable {
        return Ok(None);
    }

    let range: Range<usize> = block
        .ranges_for_entity(entity)
        .into_iter()
        .rfind(|r| r.start <= offset && offset <= r.end)
        .ok_or(ModelError::EntityRangeMismatch {
            key: block.key().to_string(),
            entity,
            offset,
            found: 0,
        })?;

    let mut updated = chars.to_vec();
    for c in &mut updated[range] {
        *c = c.apply_entity(None);
    }
    Ok(Some(block.with_character_list(updated)?))
}
