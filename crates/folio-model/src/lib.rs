#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the folio project.

Do NOT depend on this crate directly.
Use `folio-io` instead.
"#]

pub mod block;
pub mod block_map;
pub mod block_type;
pub mod character;
pub mod content;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod hash;
pub mod selection;
pub mod text;
pub mod validate;

pub use block::{Block, BlockKey, BlockShape, TreeLinks};
pub use block_map::{BlockMap, TreeLayout};
pub use block_type::BlockType;
pub use character::{CharacterMetadata, InlineStyle};
pub use content::{ContentState, ResolvedRange};
pub use diagnostics::{DiagnosticCode, ValidationDiagnostic, ValidationError};
pub use entity::{EntityInstance, EntityKey, EntityMap, Mutability};
pub use error::ModelError;
pub use selection::SelectionState;
pub use text::Utf16Text;
pub use validate::{ValidateOptions, validate_content, validate_content_with_options};

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
