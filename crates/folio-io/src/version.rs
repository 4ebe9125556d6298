//! Version constants for the interchange format, schemas and edit scripts.

/// Raw content interchange format version.
pub const RAW_FORMAT_V: u8 = 1;

/// Edit script format version (`v` field of an edit script).
pub const SCRIPT_V: u8 = 1;

/// JSON Schema bundle version for on-disk schemas under `schemas/`.
///
/// Bump this if the schema constraints change (even if the format version
/// stays the same).
pub const SCHEMA_BUNDLE_V: u8 = 1;
