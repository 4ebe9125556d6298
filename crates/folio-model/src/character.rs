//! Per-character metadata: inline styles and entity references.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::EntityKey;

/// An immutable set of inline style tags (`BOLD`, `ITALIC`, ...).
///
/// Backed by shared storage: characters carrying the same style share one
/// allocation, and cloning is a reference count bump.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineStyle(Arc<BTreeSet<String>>);

impl InlineStyle {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of<I, S>(styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Arc::new(styles.into_iter().map(Into::into).collect()))
    }

    pub fn contains(&self, style: &str) -> bool {
        self.0.contains(style)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn with(&self, style: &str) -> Self {
        if self.contains(style) {
            return self.clone();
        }
        let mut set = (*self.0).clone();
        set.insert(style.to_string());
        Self(Arc::new(set))
    }

    pub fn without(&self, style: &str) -> Self {
        if !self.contains(style) {
            return self.clone();
        }
        let mut set = (*self.0).clone();
        set.remove(style);
        Self(Arc::new(set))
    }
}

impl std::fmt::Debug for InlineStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

/// Style and entity attached to a single UTF-16 code unit of block text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterMetadata {
    style: InlineStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entity: Option<EntityKey>,
}

impl CharacterMetadata {
    pub fn create(style: InlineStyle, entity: Option<EntityKey>) -> Self {
        Self { style, entity }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn style(&self) -> &InlineStyle {
        &self.style
    }

    pub fn entity(&self) -> Option<EntityKey> {
        self.entity
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.style.contains(style)
    }

    pub fn apply_style(&self, style: &str) -> Self {
        Self {
            style: self.style.with(style),
            entity: self.entity,
        }
    }

    pub fn remove_style(&self, style: &str) -> Self {
        Self {
            style: self.style.without(style),
            entity: self.entity,
        }
    }

    pub fn apply_entity(&self, entity: Option<EntityKey>) -> Self {
        Self {
            style: self.style.clone(),
            entity,
        }
    }
}

/// Group `items` into maximal runs of "equal" neighbours and return the runs
/// that pass `filter`, as half-open index ranges.
pub fn find_ranges<T>(
    items: &[T],
    are_equal: impl Fn(&T, &T) -> bool,
    filter: impl Fn(&T) -> bool,
) -> Vec<std::ops::Range<usize>> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < items.len() {
        let mut end = start + 1;
        while end < items.len() && are_equal(&items[start], &items[end]) {
            end += 1;
        }
        if filter(&items[start]) {
            out.push(start..end);
        }
        start = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_updates_share_when_unchanged() {
        let bold = InlineStyle::of(["BOLD"]);
        let same = bold.with("BOLD");
        assert!(Arc::ptr_eq(&bold.0, &same.0));
        assert!(bold.with("ITALIC").contains("ITALIC"));
        assert!(bold.without("BOLD").is_empty());
    }

    #[test]
    fn metadata_is_a_value() {
        let a = CharacterMetadata::create(InlineStyle::of(["BOLD"]), Some(EntityKey(1)));
        let b = CharacterMetadata::empty().apply_style("BOLD").apply_entity(Some(EntityKey(1)));
        assert_eq!(a, b);
        assert_eq!(a.remove_style("BOLD").style(), &InlineStyle::none());
    }

    #[test]
    fn find_ranges_groups_runs() {
        let items = [1, 1, 2, 2, 2, 1];
        let runs = find_ranges(&items, |a, b| a == b, |_| true);
        assert_eq!(runs, vec![0..2, 2..5, 5..6]);
        let twos = find_ranges(&items, |a, b| a == b, |v| *v == 2);
        assert_eq!(twos, vec![2..5]);
    }
}
