//! Entity-aware widening of a removal range.
//!
//! Before text is deleted, the range is checked against the entities at
//! its edges:
//! - `MUTABLE` entities are edited like plain text
//! - `IMMUTABLE` entities are removed whole
//! - `SEGMENTED` entities lose whole segments (see [`crate::entity_segments`])

use std::ops::Range;

use tracing::trace;

use folio_model::{Block, EntityKey, EntityMap, ModelError, Mutability, Result, SelectionState};

use crate::entity_segments;
use crate::options::{RemovalDirection, RemovalOptions};

/// Where the entity being resolved sits relative to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Touch {
    /// Both edges are in the same entity run.
    Within,
    /// The entity covers the start edge only.
    Start,
    /// The entity covers the end edge only.
    End,
}

/// The selection that a removal of `selection` must actually delete.
///
/// `start_block` and `end_block` are the blocks holding the selection's
/// start and end. The result is always forward (`is_backward == false`).
pub fn character_removal_range(
    entity_map: &EntityMap,
    start_block: &Block,
    end_block: &Block,
    selection: &SelectionState,
    direction: RemovalDirection,
) -> Result<SelectionState> {
    character_removal_range_with_options(
        entity_map,
        start_block,
        end_block,
        selection,
        direction,
        RemovalOptions::default(),
    )
}

pub fn character_removal_range_with_options(
    entity_map: &EntityMap,
    start_block: &Block,
    end_block: &Block,
    selection: &SelectionState,
    direction: RemovalDirection,
    opts: RemovalOptions,
) -> Result<SelectionState> {
    let mut out = selection.forward();
    let start = out.anchor_offset;
    let end = out.focus_offset;
    let start_entity = start_block.entity_at(start);
    let end_entity = end.checked_sub(1).and_then(|i| end_block.entity_at(i));

    let resolve = |block: &Block, entity: EntityKey, touch: Touch| {
        entity_removal_range(entity_map, block, start..end, entity, touch, direction, opts)
    };

    match (start_entity, end_entity) {
        (None, None) => {}
        (Some(s), Some(e)) if s == e && start_block.key() == end_block.key() => {
            let r = resolve(start_block, s, Touch::Within)?;
            out.anchor_offset = r.start;
            out.focus_offset = r.end;
        }
        (Some(s), Some(e)) => {
            out.anchor_offset = resolve(start_block, s, Touch::Start)?.start;
            out.focus_offset = resolve(end_block, e, Touch::End)?.end;
        }
        (Some(s), None) => {
            out.anchor_offset = resolve(start_block, s, Touch::Start)?.start;
        }
        (None, Some(e)) => {
            out.focus_offset = resolve(end_block, e, Touch::End)?.end;
        }
    }

    trace!(
        start_key = %out.anchor_key,
        from = start,
        to = end,
        resolved_start = out.anchor_offset,
        resolved_end = out.focus_offset,
        "resolved removal range"
    );
    Ok(out)
}

fn entity_removal_range(
    entity_map: &EntityMap,
    block: &Block,
    selection: Range<usize>,
    entity: EntityKey,
    touch: Touch,
    direction: RemovalDirection,
    opts: RemovalOptions,
) -> Result<Range<usize>> {
    let mutability = entity_map.get(entity)?.mutability;
    if mutability == Mutability::Mutable {
        return Ok(selection);
    }

    let side = match touch {
        Touch::Within | Touch::Start => selection.start,
        Touch::End => selection.end,
    };
    let ranges: Vec<Range<usize>> = block
        .ranges_for_entity(entity)
        .into_iter()
        .filter(|r| r.start <= side && side <= r.end)
        .collect();
    let [entity_range] = ranges.as_slice() else {
        return Err(ModelError::EntityRangeMismatch {
            key: block.key().to_string(),
            entity,
            offset: side,
            found: ranges.len(),
        });
    };
    let entity_range = entity_range.clone();

    if mutability == Mutability::Immutable {
        return Ok(entity_range);
    }

    let target = match touch {
        Touch::Within => selection,
        Touch::Start => selection.start..entity_range.end,
        Touch::End => entity_range.start..selection.end,
    };
    Ok(entity_segments::removal_range(
        target,
        &block.text().slice(entity_range.clone()),
        entity_range.start,
        direction,
        opts.segment_separator,
    ))
}
