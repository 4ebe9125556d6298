//! UTF-16 text storage.
//!
//! Block text is addressed in UTF-16 code units, the unit every selection
//! offset in this crate is expressed in. `Utf16Text` keeps the code units in
//! shared immutable storage so cloning a block's text never copies it.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An immutable, shared sequence of UTF-16 code units.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Utf16Text(Arc<[u16]>);

impl Utf16Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_units(units: Vec<u16>) -> Self {
        Self(units.into())
    }

    pub fn units(&self) -> &[u16] {
        &self.0
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy out `range` (code-unit indices) as a new text.
    ///
    /// The range must lie within `[0, len]`; callers validate offsets first.
    pub fn slice(&self, range: Range<usize>) -> Utf16Text {
        Self::from_units(self.0[range].to_vec())
    }

    pub fn concat(&self, other: &Utf16Text) -> Utf16Text {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut units = Vec::with_capacity(self.len() + other.len());
        units.extend_from_slice(&self.0);
        units.extend_from_slice(&other.0);
        Self::from_units(units)
    }

    /// Replace `range` with `insert`, returning the new text.
    pub fn splice(&self, range: Range<usize>, insert: &Utf16Text) -> Utf16Text {
        let mut units = Vec::with_capacity(self.len() - range.len() + insert.len());
        units.extend_from_slice(&self.0[..range.start]);
        units.extend_from_slice(&insert.0);
        units.extend_from_slice(&self.0[range.end..]);
        Self::from_units(units)
    }

    /// Decode to a `String`, replacing unpaired surrogates with U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.0)
    }

    pub fn ends_with(&self, suffix: &str) -> bool {
        let suffix: Vec<u16> = suffix.encode_utf16().collect();
        self.0.ends_with(&suffix)
    }

    /// Number of Unicode code points (unpaired surrogates count as one).
    pub fn code_point_len(&self) -> usize {
        self.code_point_offset(self.len())
    }

    /// Convert a code-unit offset into a code-point offset.
    pub fn code_point_offset(&self, unit_offset: usize) -> usize {
        let end = unit_offset.min(self.len());
        let mut points = 0;
        let mut i = 0;
        while i < end {
            i += self.char_len_at(i);
            points += 1;
        }
        points
    }

    /// Convert a code-point offset into a code-unit offset, clamped to `len`.
    pub fn code_unit_offset(&self, point_offset: usize) -> usize {
        let mut i = 0;
        let mut points = 0;
        while i < self.len() && points < point_offset {
            i += self.char_len_at(i);
            points += 1;
        }
        i
    }

    /// Width in code units of the character starting at `offset`.
    ///
    /// Returns 2 for a well-formed surrogate pair, otherwise 1.
    pub fn char_len_at(&self, offset: usize) -> usize {
        match (self.0.get(offset), self.0.get(offset + 1)) {
            (Some(hi), Some(lo)) if is_high_surrogate(*hi) && is_low_surrogate(*lo) => 2,
            _ => 1,
        }
    }

    /// Width in code units of the character ending at `offset`.
    pub fn char_len_before(&self, offset: usize) -> usize {
        if offset >= 2 {
            if let (Some(hi), Some(lo)) = (self.0.get(offset - 2), self.0.get(offset - 1)) {
                if is_high_surrogate(*hi) && is_low_surrogate(*lo) {
                    return 2;
                }
            }
        }
        1
    }

    /// Split on a single code unit, keeping empty pieces.
    pub fn split(&self, separator: u16) -> Vec<Utf16Text> {
        self.0
            .split(|u| *u == separator)
            .map(|piece| Self::from_units(piece.to_vec()))
            .collect()
    }
}

pub fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

impl From<&str> for Utf16Text {
    fn from(s: &str) -> Self {
        Self::from_units(s.encode_utf16().collect())
    }
}

impl From<String> for Utf16Text {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&String> for Utf16Text {
    fn from(s: &String) -> Self {
        Self::from(s.as_str())
    }
}

impl PartialEq<str> for Utf16Text {
    fn eq(&self, other: &str) -> bool {
        self.0.iter().copied().eq(other.encode_utf16())
    }
}

impl PartialEq<&str> for Utf16Text {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Display for Utf16Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for Utf16Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl Serialize for Utf16Text {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

impl<'de> Deserialize<'de> for Utf16Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}
