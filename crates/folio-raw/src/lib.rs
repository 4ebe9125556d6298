#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the folio project.

Do NOT depend on this crate directly.
Use `folio-io` instead.
"#]

pub mod convert;
pub mod error;
pub mod schema;
pub mod serialize;

pub use convert::{from_raw, to_raw};
pub use error::RawError;
pub use schema::{RawBlock, RawContentState, RawEntity, RawEntityRange, RawInlineStyleRange};
