use folio_model::character::find_ranges;
use folio_model::{Block, ContentState};

use crate::decorator::Decorator;

/// A run of equal inline style inside a decorator range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafRange {
    pub start: usize,
    pub end: usize,
}

/// A run of code units sharing one decorator key (or none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorRange {
    pub start: usize,
    pub end: usize,
    pub decorator_key: Option<String>,
    pub leaves: Vec<LeafRange>,
}

/// Leaf structure of one block: decorator ranges, each split into style
/// leaves. An empty block has one empty range with one empty leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTree {
    pub ranges: Vec<DecoratorRange>,
}

impl BlockTree {
    pub fn generate(content: &ContentState, block: &Block, decorator: Option<&dyn Decorator>) -> Self {
        if block.is_empty() {
            return Self {
                ranges: vec![DecoratorRange {
                    start: 0,
                    end: 0,
                    decorator_key: None,
                    leaves: vec![LeafRange { start: 0, end: 0 }],
                }],
            };
        }

        let decorations = match decorator {
            Some(d) => {
                let mut slots = d.decorations(block, content);
                slots.resize(block.len(), None);
                slots
            }
            None => vec![None; block.len()],
        };

        let chars = block.characters();
        let ranges = find_ranges(&decorations, |a, b| a == b, |_| true)
            .into_iter()
            .map(|range| {
                let leaves = find_ranges(&chars[range.clone()], |a, b| a.style() == b.style(), |_| true)
                    .into_iter()
                    .map(|leaf| LeafRange {
                        start: leaf.start + range.start,
                        end: leaf.end + range.start,
                    })
                    .collect();
                DecoratorRange {
                    start: range.start,
                    end: range.end,
                    decorator_key: decorations[range.start].clone(),
                    leaves,
                }
            })
            .collect();
        Self { ranges }
    }

    pub fn leaf(&self, decorator: usize, leaf: usize) -> Option<LeafRange> {
        self.ranges.get(decorator)?.leaves.get(leaf).copied()
    }

    /// `(decorator index, leaf index)` of the leaf holding `offset`.
    ///
    /// An offset on a boundary belongs to the leaf it ends.
    pub fn locate(&self, offset: usize) -> Option<(usize, usize)> {
        for (d, range) in self.ranges.iter().enumerate() {
            for (l, leaf) in range.leaves.iter().enumerate() {
                if leaf.start <= offset && offset <= leaf.end {
                    return Some((d, l));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorator::{CompositeDecorator, EntityTypeStrategy};
    use folio_model::{Mutability, SelectionState};
    use serde_json::json;

    #[test]
    fn empty_block_has_single_empty_leaf() {
        let content = ContentState::create_from_text("");
        let tree = BlockTree::generate(&content, content.block_for_key("b0").unwrap(), None);
        assert_eq!(tree.ranges.len(), 1);
        assert_eq!(tree.leaf(0, 0), Some(LeafRange { start: 0, end: 0 }));
        assert_eq!(tree.locate(0), Some((0, 0)));
    }

    #[test]
    fn leaves_split_on_style_inside_decorator_ranges() {
        let content = ContentState::create_from_text("plain bold link");
        let content =
            folio_modifier::apply_inline_style(&content, &SelectionState::range("b0", 6, "b0", 15), "BOLD").unwrap();
        let (content, link) = content.create_entity("LINK", Mutability::Mutable, json!({}));
        let content =
            folio_modifier::apply_entity(&content, &SelectionState::range("b0", 11, "b0", 15), Some(link)).unwrap();
        let block = content.block_for_key("b0").unwrap();

        let plain = BlockTree::generate(&content, block, None);
        assert_eq!(plain.ranges.len(), 1);
        assert_eq!(
            plain.ranges[0].leaves,
            vec![LeafRange { start: 0, end: 6 }, LeafRange { start: 6, end: 15 }]
        );

        let decorator = CompositeDecorator::new().with(EntityTypeStrategy::new("LINK"));
        let tree = BlockTree::generate(&content, block, Some(&decorator));
        assert_eq!(tree.ranges.len(), 2);
        assert_eq!(tree.ranges[1].decorator_key.as_deref(), Some("0.0"));
        assert_eq!(tree.ranges[0].leaves.len(), 2);
        assert_eq!(tree.leaf(1, 0), Some(LeafRange { start: 11, end: 15 }));
        assert_eq!(tree.locate(13), Some((1, 0)));
        assert_eq!(tree.locate(6), Some((0, 0)));
        assert_eq!(tree.locate(15), Some((1, 0)));
        assert_eq!(tree.leaf(2, 0), None);
    }
}
