//! Parsing raw content JSON with actionable diagnostics.
//!
//! serde's "missing field" and "invalid type" messages point at the right
//! place but rarely say what a valid document looks like. These helpers keep
//! parsing just as strict and name the required fields in the error.

use std::fmt;

use serde::de::Error as _;
use serde_json::Value;
use tracing::debug;

use folio_model::ContentState;
use folio_raw::{RawContentState, RawError, from_raw, to_raw};

const REQUIRED_TOP_LEVEL_FIELDS: &[&str] = &["blocks"];

/// A structured error for reading or writing raw content JSON.
#[derive(Debug)]
pub enum RawJsonError {
    /// The input was not valid JSON.
    InvalidJson(serde_json::Error),
    /// The input JSON was valid, but missing required top-level fields.
    MissingRequiredTopLevelFields {
        missing: Vec<&'static str>,
        required: Vec<&'static str>,
    },
    /// JSON was valid, but did not match the raw content shape.
    InvalidRawShape(serde_json::Error),
    /// The raw content was well formed but does not describe valid content
    /// (ranges past the text, unknown entities, broken tree links).
    Conversion(RawError),
}

impl fmt::Display for RawJsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawJsonError::InvalidJson(e) => {
                write!(f, "Invalid JSON: {e}")
            }
            RawJsonError::MissingRequiredTopLevelFields { missing, required } => {
                write!(
                    f,
                    "Invalid raw content JSON: missing required top-level field(s): {}. Required top-level fields: {}.",
                    missing.join(", "),
                    required.join(", ")
                )
            }
            RawJsonError::InvalidRawShape(e) => {
                write!(
                    f,
                    "Invalid raw content JSON shape: {e}. Required top-level fields: {}.",
                    REQUIRED_TOP_LEVEL_FIELDS.join(", ")
                )
            }
            RawJsonError::Conversion(e) => {
                write!(f, "Invalid raw content: {e}")
            }
        }
    }
}

impl std::error::Error for RawJsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RawJsonError::InvalidJson(e) => Some(e),
            RawJsonError::InvalidRawShape(e) => Some(e),
            RawJsonError::Conversion(e) => Some(e),
            RawJsonError::MissingRequiredTopLevelFields { .. } => None,
        }
    }
}

impl RawJsonError {
    /// Whether the input was readable JSON but described invalid content.
    pub fn is_content_error(&self) -> bool {
        matches!(self, RawJsonError::Conversion(_))
    }
}

/// Parse raw content JSON, reporting missing top-level fields by name.
pub fn parse_raw_json_str(s: &str) -> Result<RawContentState, RawJsonError> {
    let v: Value = serde_json::from_str(s).map_err(RawJsonError::InvalidJson)?;
    let obj = v
        .as_object()
        .ok_or_else(|| RawJsonError::InvalidRawShape(serde_json::Error::custom("expected a JSON object")))?;

    let missing: Vec<&'static str> = REQUIRED_TOP_LEVEL_FIELDS
        .iter()
        .copied()
        .filter(|k| !obj.contains_key(*k))
        .collect();
    if !missing.is_empty() {
        return Err(RawJsonError::MissingRequiredTopLevelFields {
            missing,
            required: REQUIRED_TOP_LEVEL_FIELDS.to_vec(),
        });
    }

    serde_json::from_value(v).map_err(RawJsonError::InvalidRawShape)
}

/// Parse raw content JSON straight into a snapshot.
pub fn parse_content_json_str(s: &str) -> Result<ContentState, RawJsonError> {
    let raw = parse_raw_json_str(s)?;
    let content = from_raw(&raw).map_err(RawJsonError::Conversion)?;
    debug!(blocks = content.block_map().len(), "parsed content json");
    Ok(content)
}

/// Serialize a snapshot as raw content JSON.
pub fn content_to_json_string(content: &ContentState, pretty: bool) -> Result<String, RawJsonError> {
    let raw = to_raw(content).map_err(RawJsonError::Conversion)?;
    let out = if pretty {
        folio_raw::serialize::to_pretty_json(&raw)
    } else {
        folio_raw::serialize::to_minified_json(&raw)
    };
    out.map_err(RawJsonError::InvalidJson)
}
