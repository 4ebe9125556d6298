//! Stable fingerprints for blocks.
//!
//! Used for cheap change detection in tooling (e.g. `folio inspect`) where
//! pointer identity is not available because the snapshots were loaded
//! separately.

use xxhash_rust::xxh3::xxh3_64;

use crate::block::Block;
use crate::text::Utf16Text;

/// Compute an xxh3 hash (hex) over the UTF-8 form of `text`.
///
/// Returned as fixed-width 16-char lowercase hex.
pub fn text_fingerprint(text: &Utf16Text) -> String {
    xxh64_hex(&text.to_string_lossy())
}

pub fn xxh64_hex(input: &str) -> String {
    format!("{:016x}", xxh3_64(input.as_bytes()))
}

/// Fingerprint of everything that affects how a block renders: type, depth,
/// text and the per-character style/entity runs. The key is excluded.
///
/// Payload lines:
/// `{type}\t{depth}\t{text}\n` then one `{start}\t{end}\t{styles}\t{entity}\n`
/// per metadata run.
pub fn block_fingerprint(block: &Block) -> String {
    let mut payload = String::new();
    payload.push_str(block.block_type().as_str());
    payload.push('\t');
    payload.push_str(&block.depth().to_string());
    payload.push('\t');
    payload.push_str(&block.text().to_string_lossy());
    payload.push('\n');

    let chars = block.characters();
    let runs = crate::character::find_ranges(chars, |a, b| a == b, |_| true);
    for run in runs {
        let meta = &chars[run.start];
        let styles: Vec<&str> = meta.style().iter().collect();
        payload.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            run.start,
            run.end,
            styles.join(","),
            meta.entity().map(|e| e.to_string()).unwrap_or_default()
        ));
    }

    xxh64_hex(&payload)
}
