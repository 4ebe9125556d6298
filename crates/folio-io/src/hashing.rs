//! Hash helpers for canonical JSON and content fingerprints.

use serde::Serialize;

use folio_model::ContentState;
use folio_model::hash::{block_fingerprint, xxh64_hex};

use crate::canonical_json::{content_to_canonical_json, to_canonical_json_bytes};
use crate::raw_json::RawJsonError;

/// Return lowercase hex SHA-256 of bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hash canonical JSON bytes using SHA-256 and return lowercase hex.
pub fn sha256_canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(sha256_hex(&bytes))
}

/// SHA-256 of the snapshot's canonical raw JSON.
///
/// Block keys and entity contents count; entity key numbering does not,
/// since export renumbers entities by first use.
pub fn content_sha256(content: &ContentState) -> Result<String, RawJsonError> {
    let canonical = content_to_canonical_json(content)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Fast fingerprint over per-block fingerprints, in document order.
///
/// Ignores block keys and entity payloads; good for "did the visible text
/// or styling change" checks, not for integrity.
pub fn content_xxh64(content: &ContentState) -> String {
    let joined: Vec<String> = content.block_map().blocks().map(|b| block_fingerprint(b)).collect();
    xxh64_hex(&joined.join("\n"))
}

/// Cache key for derived artifacts of a snapshot.
///
///   folio|schema=v<N>|content=sha256:<hash>
pub fn content_cache_key(content: &ContentState) -> Result<String, RawJsonError> {
    let hash = content_sha256(content)?;
    Ok(format!(
        "folio|schema=v{}|content=sha256:{hash}",
        crate::version::SCHEMA_BUNDLE_V
    ))
}
