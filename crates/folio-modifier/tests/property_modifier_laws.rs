use std::collections::HashMap;

use proptest::prelude::*;
use serde_json::Value;

use folio_model::{ContentState, EntityKey, InlineStyle, Mutability, SelectionState, Utf16Text, validate_content};
use folio_modifier::{
    RemovalDirection, apply_entity, apply_inline_style, insert_text, remove_range, replace_text, split_block,
};

#[derive(Debug, Clone)]
enum Op {
    Insert { block: usize, at: usize, text: String },
    Remove { from: (usize, usize), to: (usize, usize) },
    Replace { block: usize, a: usize, b: usize, text: String },
    Split { block: usize, at: usize },
    Bold { from: (usize, usize), to: (usize, usize) },
    ApplyEntity { mutability: Mutability, block: usize, a: usize, b: usize },
}

fn mutability() -> impl Strategy<Value = Mutability> {
    prop_oneof![
        Just(Mutability::Mutable),
        Just(Mutability::Immutable),
        Just(Mutability::Segmented),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    let pos = (0usize..8, 0usize..32);
    prop_oneof![
        (0usize..8, 0usize..32, "[a-z😀 ]{0,4}").prop_map(|(block, at, text)| Op::Insert { block, at, text }),
        (pos.clone(), pos.clone()).prop_map(|(from, to)| Op::Remove { from, to }),
        (0usize..8, 0usize..32, 0usize..32, "[A-Z]{0,3}")
            .prop_map(|(block, a, b, text)| Op::Replace { block, a, b, text }),
        (0usize..8, 0usize..32).prop_map(|(block, at)| Op::Split { block, at }),
        (pos.clone(), pos).prop_map(|(from, to)| Op::Bold { from, to }),
        (mutability(), 0usize..8, 0usize..32, 0usize..32)
            .prop_map(|(mutability, block, a, b)| Op::ApplyEntity { mutability, block, a, b }),
    ]
}

/// Clamp a raw (block, offset) pair onto a real position.
fn position(content: &ContentState, (block, offset): (usize, usize)) -> (String, usize, usize) {
    let blocks = content.blocks_as_array();
    let idx = block % blocks.len();
    let b = &blocks[idx];
    (b.key().to_string(), offset.min(b.len()), idx)
}

/// A forward selection between two clamped positions.
fn range(content: &ContentState, a: (usize, usize), b: (usize, usize)) -> SelectionState {
    let (ka, oa, ia) = position(content, a);
    let (kb, ob, ib) = position(content, b);
    if (ia, oa) <= (ib, ob) {
        SelectionState::range(ka, oa, kb, ob)
    } else {
        SelectionState::range(kb, ob, ka, oa)
    }
}

fn apply(content: &ContentState, op: &Op) -> ContentState {
    let none = InlineStyle::none();
    match op {
        Op::Insert { block, at, text } => {
            let (key, offset, _) = position(content, (*block, *at));
            insert_text(content, &SelectionState::collapsed_at(key, offset), text.as_str(), &none, None).unwrap()
        }
        Op::Remove { from, to } => {
            remove_range(content, &range(content, *from, *to), RemovalDirection::Backward).unwrap()
        }
        Op::Replace { block, a, b, text } => {
            let sel = range(content, (*block, *a), (*block, *b));
            replace_text(content, &sel, text.as_str(), &none, None).unwrap()
        }
        Op::Split { block, at } => {
            let (key, offset, _) = position(content, (*block, *at));
            split_block(content, &SelectionState::collapsed_at(key, offset)).unwrap()
        }
        Op::Bold { from, to } => apply_inline_style(content, &range(content, *from, *to), "BOLD").unwrap(),
        Op::ApplyEntity { mutability, block, a, b } => {
            let sel = range(content, (*block, *a), (*block, *b));
            let (content, key) = content.create_entity("TOKEN", *mutability, Value::Null);
            apply_entity(&content, &sel, Some(key)).unwrap()
        }
    }
}

/// Blocks and runs covered by each non-mutable entity key.
fn non_mutable_runs(content: &ContentState) -> HashMap<EntityKey, Vec<(String, usize, usize)>> {
    let mut runs: HashMap<EntityKey, Vec<(String, usize, usize)>> = HashMap::new();
    for block in content.block_map().blocks() {
        for run in block.find_entity_ranges(|e| e.is_some()) {
            let Some(key) = block.entity_at(run.start) else { continue };
            if content.entity(key).unwrap().mutability == Mutability::Mutable {
                continue;
            }
            runs.entry(key).or_default().push((block.key().to_string(), run.start, run.end));
        }
    }
    runs
}

proptest! {
    #[test]
    fn every_operation_keeps_characters_aligned(
        text in "[a-z😀 \n]{0,40}",
        ops in proptest::collection::vec(op(), 1..12),
    ) {
        let mut content = ContentState::create_from_text(&text);
        for op in &ops {
            content = apply(&content, op);
            prop_assert!(validate_content(&content).is_ok(), "{:?} broke {:?}", op, content);
            for block in content.block_map().blocks() {
                prop_assert_eq!(block.characters().len(), block.len());
            }
            for (key, runs) in non_mutable_runs(&content) {
                prop_assert_eq!(runs.len(), 1, "{:?} left entity {} in pieces: {:?}", op, key, runs);
            }
        }
    }

    #[test]
    fn removal_touching_immutable_entity_removes_all_of_it(
        text in "[a-z ]{4,30}",
        entity in (0usize..32, 0usize..32),
        removal in (0usize..32, 0usize..32),
        backward in any::<bool>(),
    ) {
        let content = ContentState::create_from_text(&text);
        let len = content.first_block().unwrap().len();
        let (p, q) = (entity.0.min(entity.1).min(len), entity.0.max(entity.1).min(len));
        let (a, b) = (removal.0.min(removal.1).min(len), removal.0.max(removal.1).min(len));
        prop_assume!(p < q && a < b && a < q && b > p);

        let (content, key) = content.create_entity("MENTION", Mutability::Immutable, Value::Null);
        let content = apply_entity(&content, &SelectionState::range("b0", p, "b0", q), Some(key)).unwrap();
        let direction = if backward { RemovalDirection::Backward } else { RemovalDirection::Forward };
        let out = remove_range(&content, &SelectionState::range("b0", a, "b0", b), direction).unwrap();

        let block = out.block_for_key("b0").unwrap();
        prop_assert!(block.ranges_for_entity(key).is_empty());
        let (lo, hi) = (a.min(p), b.max(q));
        prop_assert_eq!(block.len(), len - (hi - lo));
    }

    #[test]
    fn insert_splices_at_offset(text in "[a-z😀]{0,20}", inserted in "[A-Z😀]{1,6}", at in 0usize..48) {
        let content = ContentState::create_from_text(&text);
        let block = content.first_block().unwrap().clone();
        let offset = at.min(block.len());

        let out = insert_text(&content, &SelectionState::collapsed_at("b0", offset), inserted.as_str(), &InlineStyle::none(), None).unwrap();
        let inserted = Utf16Text::from(inserted.as_str());
        let expected = block.text().slice(0..offset).concat(&inserted).concat(&block.text().slice(offset..block.len()));

        prop_assert_eq!(out.block_for_key("b0").unwrap().text(), &expected);
        prop_assert_eq!(out.selection_after(), &SelectionState::collapsed_at("b0", offset + inserted.len()));
    }

    #[test]
    fn split_then_merge_is_identity(text in "[a-z ]{0,30}", at in 0usize..32, style_from in 0usize..32, style_to in 0usize..32) {
        let content = ContentState::create_from_text(&text);
        let len = content.first_block().unwrap().len();
        let (lo, hi) = (style_from.min(style_to).min(len), style_from.max(style_to).min(len));
        let content = apply_inline_style(&content, &SelectionState::range("b0", lo, "b0", hi), "BOLD").unwrap();
        let original = content.first_block().unwrap().clone();
        let offset = at.min(len);

        let split = split_block(&content, &SelectionState::collapsed_at("b0", offset)).unwrap();
        let below = split.selection_after().anchor_key.clone();
        let merged = remove_range(&split, &SelectionState::range("b0", offset, below, 0), RemovalDirection::Forward).unwrap();

        let block = merged.block_for_key("b0").unwrap();
        prop_assert_eq!(block.text(), original.text());
        prop_assert_eq!(block.characters(), original.characters());
        prop_assert_eq!(merged.block_map().len(), 1);
    }
}
