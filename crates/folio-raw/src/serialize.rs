use crate::schema::RawContentState;

/// Serialize as minified JSON (no whitespace).
pub fn to_minified_json(raw: &RawContentState) -> Result<String, serde_json::Error> {
    serde_json::to_string(raw)
}

/// Serialize as pretty JSON (for debugging).
pub fn to_pretty_json(raw: &RawContentState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(raw)
}
