#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the folio project.

Do NOT depend on this crate directly.
Use `folio-io` instead.
"#]

pub mod edges;
pub mod entity_segments;
pub mod modifier;
pub mod options;
pub mod removal;
pub mod tree;

pub use edges::remove_entities_at_edges;
pub use modifier::{
    apply_entity, apply_inline_style, insert_text, merge_block_data, remove_inline_style, remove_range,
    remove_range_with_options, replace_text, set_block_data, set_block_type, split_block,
};
pub use options::{RemovalDirection, RemovalOptions, SegmentSeparator};
pub use removal::{character_removal_range, character_removal_range_with_options};
