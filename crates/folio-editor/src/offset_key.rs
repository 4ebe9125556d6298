use std::fmt;
use std::str::FromStr;

use crate::error::EditorError;

/// Address of one rendered leaf: `<blockKey>-<decoratorIndex>-<leafIndex>`.
///
/// Block keys may themselves contain `-`; only the last two segments are
/// indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OffsetKey {
    pub block_key: String,
    pub decorator: usize,
    pub leaf: usize,
}

impl OffsetKey {
    pub fn new(block_key: impl Into<String>, decorator: usize, leaf: usize) -> Self {
        Self {
            block_key: block_key.into(),
            decorator,
            leaf,
        }
    }

    pub fn decode(s: &str) -> Result<Self, EditorError> {
        let malformed = || EditorError::MalformedOffsetKey(s.to_string());
        let mut parts = s.rsplitn(3, '-');
        let leaf = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let decorator = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let block_key = parts.next().filter(|k| !k.is_empty()).ok_or_else(malformed)?;
        Ok(Self::new(block_key, decorator, leaf))
    }
}

impl fmt::Display for OffsetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.block_key, self.decorator, self.leaf)
    }
}

impl FromStr for OffsetKey {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
