use serde::{Deserialize, Serialize};

/// Which way a deletion runs. Only affects how segmented entities snap to a
/// segment boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalDirection {
    #[default]
    Forward,
    Backward,
}

/// The code unit that splits a segmented entity's text into segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentSeparator(u16);

impl SegmentSeparator {
    /// Separators must fit in one UTF-16 code unit.
    pub fn from_char(c: char) -> Option<Self> {
        let mut buf = [0u16; 2];
        match c.encode_utf16(&mut buf) {
            [unit] => Some(Self(*unit)),
            _ => None,
        }
    }

    pub fn unit(self) -> u16 {
        self.0
    }
}

impl Default for SegmentSeparator {
    fn default() -> Self {
        Self(u16::from(b' '))
    }
}

/// Removal configuration options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalOptions {
    pub segment_separator: SegmentSeparator,
}
