use serde::{Deserialize, Serialize};

/// Stable, machine-readable diagnostic codes for content validation.
///
/// These codes are intended for programmatic handling (CI, tooling), while
/// `message` remains human-oriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// The document has no blocks at all.
    EmptyDocument,
    /// A block's character list length differs from its text length.
    CharacterListMismatch,
    /// A character references an entity missing from the entity map.
    UnknownEntity,
    /// Some blocks are tree blocks and others are flat.
    MixedBlockShapes,
    /// A parent, child or sibling link names a block that does not exist.
    DanglingLink,
    /// A parent does not list the child, or a child names another parent.
    ParentChildMismatch,
    /// Sibling links disagree with the order of the parent's child list.
    SiblingMismatch,
    /// Map order is not a pre-order walk of the tree.
    OrderMismatch,
    /// A selection names an unknown block or an offset past the block end.
    SelectionOutOfRange,
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDiagnostic {
    pub code: DiagnosticCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_key: Option<String>,
    pub message: String,
}

impl ValidationDiagnostic {
    pub fn new(code: DiagnosticCode, block_key: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code,
            block_key: block_key.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Structured error wrapper for validation failures.
///
/// Validation collects every problem it finds rather than stopping at the
/// first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationError {
    pub fn single(diag: ValidationDiagnostic) -> Self {
        Self {
            diagnostics: vec![diag],
        }
    }

    /// First diagnostic's message (or a generic fallback).
    pub fn first_message(&self) -> String {
        self.diagnostics
            .first()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| "validation failed".to_string())
    }

    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_message())
    }
}

impl std::error::Error for ValidationError {}
