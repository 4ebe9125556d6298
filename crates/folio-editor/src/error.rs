use thiserror::Error;

use folio_model::ModelError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("malformed offset key {0:?}: expected <blockKey>-<decoratorIndex>-<leafIndex>")]
    MalformedOffsetKey(String),

    /// The offset key names a decorator range or leaf the block tree lacks.
    #[error("no leaf {leaf} in decorator range {decorator} of block {block:?}")]
    UnknownLeaf {
        block: String,
        decorator: usize,
        leaf: usize,
    },

    #[error("leaf window {start}..{end} does not fit block {block:?} with length {len}")]
    LeafOutOfRange {
        block: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}
