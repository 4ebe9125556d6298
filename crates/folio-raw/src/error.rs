use thiserror::Error;

use folio_model::ModelError;

/// Errors raised while turning raw content into a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RawError {
    #[error("document has no blocks")]
    NoBlocks,

    #[error("block {block:?}: {kind} range at {offset} with length {length} exceeds text length {len}")]
    RangeOutOfBounds {
        block: String,
        kind: &'static str,
        offset: usize,
        length: usize,
        len: usize,
    },

    #[error("block {block:?} references entity {key} which is not in the entity map")]
    UnknownEntity { block: String, key: u64 },

    #[error(transparent)]
    Model(#[from] ModelError),
}
