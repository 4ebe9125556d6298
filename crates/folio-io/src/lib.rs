//! `folio-io` is the single supported public entrypoint for the folio
//! rich-text engine: the content model, edit operations, editor history,
//! surface reconciliation and the raw interchange format.
//!
//! On top of the engine crates it adds the pieces tools need:
//! - canonical JSON and content fingerprints
//! - raw JSON parsing with actionable errors
//! - edit scripts, a JSON list of editor operations to replay

// -----------------------------------------------------------------------------
// Public API contract
// -----------------------------------------------------------------------------
//
// Consumers SHOULD import from `folio_io::prelude::*`.
// Anything not re-exported via the prelude is considered internal and may change
// without notice.

#[doc(hidden)]
pub mod model {
    pub use folio_model::hash::{block_fingerprint, text_fingerprint};
    pub use folio_model::{
        Block, BlockKey, BlockType, CharacterMetadata, ContentState, EntityInstance, EntityKey, EntityMap,
        InlineStyle, ModelError, Mutability, SelectionState, TreeLinks, Utf16Text,
    };
}

#[doc(hidden)]
pub mod modifier {
    pub use folio_modifier::*;
}

#[doc(hidden)]
pub mod raw {
    pub use folio_raw::serialize::{to_minified_json, to_pretty_json};
    pub use folio_raw::{
        RawBlock, RawContentState, RawEntity, RawEntityRange, RawError, RawInlineStyleRange, from_raw, to_raw,
    };
}

#[doc(hidden)]
pub mod editor {
    pub use folio_editor::*;
}

/// Internal validation helpers.
#[doc(hidden)]
pub mod validate {
    pub use folio_model::{
        DiagnosticCode, ValidateOptions, ValidationDiagnostic, ValidationError, validate_content,
        validate_content_with_options,
    };
}

/// Deterministic JSON canonicalization helpers.
pub mod canonical_json;

/// Hash helpers for canonical JSON and content fingerprints.
pub mod hashing;

/// Raw content JSON parsing with diagnostics.
pub mod raw_json;

/// Replayable edit scripts.
pub mod script;

/// Version constants for the interchange format and schemas.
pub mod version;

/// Convenience prelude for consumers.
///
/// This is the **only supported** import surface for external users.
pub mod prelude {
    pub use crate::editor::{
        ChangeType, CompositeDecorator, Decorator, DecoratorStrategy, EditorError, EditorState,
        EntityTypeStrategy, HistoryOptions, InputType, OffsetKey, SelectionTrust, SurfaceInput, SurfaceOutcome,
        reconcile_surface,
    };
    pub use crate::model::{
        Block, BlockType, ContentState, EntityKey, InlineStyle, ModelError, Mutability, SelectionState,
    };
    pub use crate::modifier::{RemovalDirection, RemovalOptions, SegmentSeparator};
    pub use crate::raw::{RawContentState, RawError, from_raw, to_raw};
    pub use crate::raw_json::{RawJsonError, content_to_json_string, parse_content_json_str, parse_raw_json_str};
    pub use crate::script::{EditScript, ScriptError, ScriptOp, ScriptOptions, run_script};
    pub use crate::validate::{DiagnosticCode, ValidationDiagnostic, ValidationError, validate_content};
    pub use crate::{canonical_json, hashing};
}
