//! Segment-wise removal inside a segmented entity.

use std::ops::Range;

use folio_model::Utf16Text;

use crate::options::{RemovalDirection, SegmentSeparator};

/// Removal range for a deletion of `selection` inside a segmented entity.
///
/// `text` is the entity's text and `entity_start` its offset in the block.
/// The text is split on `separator`; each separator is attached to the
/// following segment (forward) or the preceding one (backward). Every segment
/// the selection overlaps is removed. When the removal reaches exactly one end
/// of the entity, one more code unit is absorbed on the side given by
/// `direction`, so no dangling separator is left behind.
///
/// A selection that overlaps no segment is returned unchanged.
pub fn removal_range(
    selection: Range<usize>,
    text: &Utf16Text,
    entity_start: usize,
    direction: RemovalDirection,
    separator: SegmentSeparator,
) -> Range<usize> {
    let pieces = text.split(separator.unit());
    let last = pieces.len().saturating_sub(1);

    let mut removal: Option<Range<usize>> = None;
    let mut segment_start = entity_start;
    for (i, piece) in pieces.iter().enumerate() {
        let attached = match direction {
            RemovalDirection::Forward => usize::from(i > 0),
            RemovalDirection::Backward => usize::from(i < last),
        };
        let segment_end = segment_start + piece.len() + attached;
        if selection.start < segment_end && segment_start < selection.end {
            removal = Some(match removal {
                Some(r) => r.start..segment_end,
                None => segment_start..segment_end,
            });
        } else if removal.is_some() {
            break;
        }
        segment_start = segment_end;
    }

    let Some(mut removal) = removal else {
        return selection;
    };

    let entity_end = entity_start + text.len();
    let at_start = removal.start == entity_start;
    let at_end = removal.end == entity_end;
    if at_start != at_end {
        match direction {
            RemovalDirection::Forward if removal.end != entity_end => removal.end += 1,
            RemovalDirection::Backward if removal.start != entity_start => removal.start -= 1,
            _ => {}
        }
    }
    removal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(sel: Range<usize>, text: &str, start: usize, dir: RemovalDirection) -> Range<usize> {
        removal_range(sel, &Utf16Text::from(text), start, dir, SegmentSeparator::default())
    }

    #[test]
    fn removes_one_whole_segment() {
        // "Hello World Foo": deleting inside "World" takes exactly that word
        // plus one separator.
        assert_eq!(range(7..8, "Hello World Foo", 0, RemovalDirection::Backward), 6..12);
        assert_eq!(range(7..8, "Hello World Foo", 0, RemovalDirection::Forward), 5..11);
    }

    #[test]
    fn first_segment_absorbs_following_separator() {
        // Backward: separator is already attached to "Hello ".
        assert_eq!(range(4..5, "Hello World", 0, RemovalDirection::Backward), 0..6);
        // Forward: "Hello" reaches the entity start only, so the end grows.
        assert_eq!(range(4..5, "Hello World", 0, RemovalDirection::Forward), 0..6);
    }

    #[test]
    fn last_segment_absorbs_preceding_separator() {
        assert_eq!(range(10..11, "Hello World", 0, RemovalDirection::Backward), 5..11);
        assert_eq!(range(10..11, "Hello World", 0, RemovalDirection::Forward), 5..11);
    }

    #[test]
    fn offsets_are_relative_to_the_block() {
        assert_eq!(range(13..14, "Hello World", 10, RemovalDirection::Backward), 10..16);
    }

    #[test]
    fn whole_entity_when_all_segments_touched() {
        assert_eq!(range(2..9, "Hello World", 0, RemovalDirection::Forward), 0..11);
    }

    #[test]
    fn custom_separator() {
        let sep = SegmentSeparator::from_char(',').unwrap();
        let text = Utf16Text::from("a,bb,c");
        assert_eq!(removal_range(2..3, &text, 0, RemovalDirection::Backward, sep), 2..5);
    }
}
