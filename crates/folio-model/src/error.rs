//! Error types for model operations.
//!
//! Every variant is a contract violation by the caller: a selection that
//! points outside the document, an operation that needs a collapsed cursor, an
//! entity key that was never issued. None of these can be produced by user
//! input alone, so callers should treat them as fatal for the edit in flight.

use thiserror::Error;

use crate::block::BlockKey;
use crate::entity::EntityKey;

/// Invariant violations raised by model and modifier operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A selection or operation referenced a block that is not in the map.
    #[error("unknown block key {0:?}")]
    UnknownBlock(BlockKey),

    /// Two blocks with the same key were handed to a block map builder.
    #[error("duplicate block key {0:?}")]
    DuplicateBlock(BlockKey),

    /// An offset fell outside `[0, len]` for its block.
    #[error("offset {offset} out of range for block {key:?} with length {len}")]
    OffsetOutOfRange {
        key: BlockKey,
        offset: usize,
        len: usize,
    },

    /// The normalized start of a range lies after its end.
    #[error("inverted range: start {start_key:?}@{start_offset} is after end {end_key:?}@{end_offset}")]
    InvertedRange {
        start_key: BlockKey,
        start_offset: usize,
        end_key: BlockKey,
        end_offset: usize,
    },

    /// The operation only accepts a collapsed selection.
    #[error("{operation} requires a collapsed selection")]
    SelectionNotCollapsed { operation: &'static str },

    /// A character referenced an entity that is not in the entity map.
    #[error("unknown entity key {0}")]
    UnknownEntity(EntityKey),

    /// Entity range resolution did not find exactly one range around an offset.
    #[error(
        "expected exactly one range of entity {entity} around offset {offset} in block {key:?}, found {found}"
    )]
    EntityRangeMismatch {
        key: BlockKey,
        entity: EntityKey,
        offset: usize,
        found: usize,
    },

    /// A block's character metadata does not line up with its text.
    #[error("block {key:?} has {characters} character entries for {text_len} text units")]
    CharacterListMismatch {
        key: BlockKey,
        characters: usize,
        text_len: usize,
    },
}
