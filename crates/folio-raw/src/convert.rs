use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Range;

use indexmap::IndexMap;
use tracing::debug;

use folio_model::character::find_ranges;
use folio_model::content::default_block_key;
use folio_model::{
    Block, CharacterMetadata, ContentState, EntityInstance, EntityKey, EntityMap, TreeLinks, Utf16Text,
};

use crate::error::RawError;
use crate::schema::{RawBlock, RawContentState, RawEntity, RawEntityRange, RawInlineStyleRange};

/// Convert a snapshot into the raw interchange shape.
///
/// Entities are renumbered `0, 1, ...` in order of first use; entities no
/// character references are not exported. Tree content is nested under
/// `children`.
pub fn to_raw(content: &ContentState) -> Result<RawContentState, RawError> {
    let mut entity_numbers: IndexMap<EntityKey, u64> = IndexMap::new();
    let mut encoded: HashMap<&str, RawBlock> = HashMap::new();
    for block in content.block_map().blocks() {
        encoded.insert(block.key(), encode_block(block, &mut entity_numbers));
    }

    let blocks = if content.is_tree() {
        let map = content.block_map();
        let roots: Vec<&str> = map
            .blocks()
            .filter(|b| b.parent_key().is_none())
            .map(|b| b.key())
            .collect();
        nest(&roots, content, &mut encoded)
    } else {
        content
            .block_map()
            .keys()
            .filter_map(|k| encoded.remove(k.as_str()))
            .collect()
    };

    let mut entity_map = IndexMap::new();
    for (key, number) in &entity_numbers {
        let entity = content.entity(*key)?;
        entity_map.insert(
            number.to_string(),
            RawEntity {
                entity_type: entity.entity_type.clone(),
                mutability: entity.mutability,
                data: entity.data.clone(),
            },
        );
    }

    Ok(RawContentState { blocks, entity_map })
}

fn nest(keys: &[&str], content: &ContentState, encoded: &mut HashMap<&str, RawBlock>) -> Vec<RawBlock> {
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(mut raw) = encoded.remove(*key) else {
            continue;
        };
        let child_keys: Vec<&str> = content
            .get_block(key)
            .map(|b| b.child_keys().iter().map(String::as_str).collect())
            .unwrap_or_default();
        raw.children = Some(nest(&child_keys, content, encoded));
        out.push(raw);
    }
    out
}

fn encode_block(block: &Block, entity_numbers: &mut IndexMap<EntityKey, u64>) -> RawBlock {
    let text = block.text();
    let chars = block.characters();
    let points = |r: Range<usize>| {
        let offset = text.code_point_offset(r.start);
        (offset, text.code_point_offset(r.end) - offset)
    };

    let styles: BTreeSet<&str> = chars.iter().flat_map(|c| c.style().iter()).collect();
    let mut inline_style_ranges = Vec::new();
    for style in styles {
        let runs = find_ranges(chars, |a, b| a.has_style(style) == b.has_style(style), |c| c.has_style(style));
        for run in runs {
            let (offset, length) = points(run);
            inline_style_ranges.push(RawInlineStyleRange {
                offset,
                length,
                style: style.to_string(),
            });
        }
    }

    let mut entity_ranges = Vec::new();
    for run in block.find_entity_ranges(|e| e.is_some()) {
        let Some(entity) = chars[run.start].entity() else {
            continue;
        };
        let next = entity_numbers.len() as u64;
        let key = *entity_numbers.entry(entity).or_insert(next);
        let (offset, length) = points(run);
        entity_ranges.push(RawEntityRange { offset, length, key });
    }

    RawBlock {
        key: Some(block.key().to_string()),
        block_type: block.block_type().clone(),
        text: text.to_string_lossy(),
        depth: block.depth(),
        inline_style_ranges,
        entity_ranges,
        data: block.data().clone(),
        children: None,
    }
}

/// Build a snapshot from raw content.
///
/// Blocks without a key get `b0`, `b1`, ... (skipping keys already in use).
/// If any block carries `children`, the whole document is read as a tree.
pub fn from_raw(raw: &RawContentState) -> Result<ContentState, RawError> {
    if raw.blocks.is_empty() {
        return Err(RawError::NoBlocks);
    }

    let mut entity_map = EntityMap::new();
    let mut entity_keys = HashMap::new();
    for (number, entity) in &raw.entity_map {
        let instance = EntityInstance::new(entity.entity_type.clone(), entity.mutability, entity.data.clone());
        let (next, key) = entity_map.add(instance);
        entity_map = next;
        entity_keys.insert(number.clone(), key);
    }

    let mut decoder = Decoder {
        entity_keys,
        taken: HashSet::new(),
        next_generated: 0,
    };
    collect_keys(&raw.blocks, &mut decoder.taken);

    let mut blocks = Vec::new();
    let is_tree = raw.blocks.iter().any(|b| b.children.is_some());
    let root_keys: Vec<String> = raw.blocks.iter().map(|b| decoder.key_for(b)).collect();
    if is_tree {
        decoder.decode_tree(&raw.blocks, &root_keys, None, &mut blocks)?;
    } else {
        for (block, key) in raw.blocks.iter().zip(&root_keys) {
            blocks.push(decoder.decode_block(block, key)?);
        }
    }

    debug!(blocks = blocks.len(), entities = entity_map.len(), tree = is_tree, "decoded raw content");
    Ok(ContentState::create_from_block_array(blocks, entity_map)?)
}

fn collect_keys(blocks: &[RawBlock], out: &mut HashSet<String>) {
    for block in blocks {
        if let Some(key) = &block.key {
            out.insert(key.clone());
        }
        if let Some(children) = &block.children {
            collect_keys(children, out);
        }
    }
}

struct Decoder {
    entity_keys: HashMap<String, EntityKey>,
    taken: HashSet<String>,
    next_generated: usize,
}

impl Decoder {
    fn key_for(&mut self, block: &RawBlock) -> String {
        if let Some(key) = &block.key {
            return key.clone();
        }
        loop {
            let candidate = default_block_key(self.next_generated);
            self.next_generated += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    fn decode_tree(
        &mut self,
        siblings: &[RawBlock],
        keys: &[String],
        parent: Option<&str>,
        out: &mut Vec<Block>,
    ) -> Result<(), RawError> {
        for (i, (raw, key)) in siblings.iter().zip(keys).enumerate() {
            let children = raw.children.as_deref().unwrap_or_default();
            let child_keys: Vec<String> = children.iter().map(|c| self.key_for(c)).collect();
            let links = TreeLinks {
                parent: parent.map(String::from),
                children: child_keys.clone(),
                prev_sibling: i.checked_sub(1).map(|j| keys[j].clone()),
                next_sibling: keys.get(i + 1).cloned(),
            };
            out.push(self.decode_block(raw, key)?.with_links(links));
            self.decode_tree(children, &child_keys, Some(key), out)?;
        }
        Ok(())
    }

    fn decode_block(&self, raw: &RawBlock, key: &str) -> Result<Block, RawError> {
        let text = Utf16Text::from(raw.text.as_str());
        let mut chars = vec![CharacterMetadata::empty(); text.len()];

        for range in &raw.inline_style_ranges {
            let span = unit_span(&text, range.offset, range.length).ok_or_else(|| RawError::RangeOutOfBounds {
                block: key.to_string(),
                kind: "style",
                offset: range.offset,
                length: range.length,
                len: text.code_point_len(),
            })?;
            for c in &mut chars[span] {
                *c = c.apply_style(&range.style);
            }
        }

        for range in &raw.entity_ranges {
            let span = unit_span(&text, range.offset, range.length).ok_or_else(|| RawError::RangeOutOfBounds {
                block: key.to_string(),
                kind: "entity",
                offset: range.offset,
                length: range.length,
                len: text.code_point_len(),
            })?;
            let entity = self
                .entity_keys
                .get(&range.key.to_string())
                .copied()
                .ok_or_else(|| RawError::UnknownEntity {
                    block: key.to_string(),
                    key: range.key,
                })?;
            for c in &mut chars[span] {
                *c = c.apply_entity(Some(entity));
            }
        }

        Ok(Block::with_characters(key, raw.block_type.clone(), text, chars)?
            .with_depth(raw.depth)
            .with_data(raw.data.clone()))
    }
}

/// Code-point range `offset..offset + length` as code units, if it fits.
fn unit_span(text: &Utf16Text, offset: usize, length: usize) -> Option<Range<usize>> {
    let end = offset.checked_add(length)?;
    if end > text.code_point_len() {
        return None;
    }
    Some(text.code_unit_offset(offset)..text.code_unit_offset(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{BlockType, Mutability, SelectionState};
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawContentState {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn offsets_are_code_points() {
        let content = from_raw(&raw(json!({
            "blocks": [{
                "key": "a",
                "text": "😀 hi",
                "inlineStyleRanges": [{"offset": 2, "length": 2, "style": "BOLD"}]
            }]
        })))
        .unwrap();
        let block = content.block_for_key("a").unwrap();
        // "😀" is two code units, so "hi" starts at unit 3.
        assert!(!block.characters()[2].has_style("BOLD"));
        assert!(block.characters()[3].has_style("BOLD"));
        assert!(block.characters()[4].has_style("BOLD"));

        let back = to_raw(&content).unwrap();
        assert_eq!(
            back.blocks[0].inline_style_ranges,
            vec![RawInlineStyleRange { offset: 2, length: 2, style: "BOLD".into() }]
        );
    }

    #[test]
    fn entities_are_renumbered_by_first_use() {
        let content = ContentState::create_from_text("ab cd");
        let (content, unused) = content.create_entity("UNUSED", Mutability::Mutable, json!(null));
        let (content, link) = content.create_entity("LINK", Mutability::Mutable, json!({"url": "x"}));
        assert_ne!(unused, link);
        let block = content.block_for_key("b0").unwrap();
        let chars = block
            .characters()
            .iter()
            .enumerate()
            .map(|(i, c)| if i >= 3 { c.apply_entity(Some(link)) } else { c.clone() })
            .collect();
        let block = block.with_character_list(chars).unwrap();
        let content = content.clone().with_block_map(content.block_map().with_block(block).unwrap());

        let out = to_raw(&content).unwrap();
        assert_eq!(out.entity_map.len(), 1);
        assert_eq!(out.entity_map["0"].entity_type, "LINK");
        assert_eq!(out.blocks[0].entity_ranges, vec![RawEntityRange { offset: 3, length: 2, key: 0 }]);
    }

    #[test]
    fn missing_keys_are_generated_around_explicit_ones() {
        let content = from_raw(&raw(json!({
            "blocks": [{"text": "one"}, {"key": "b0", "text": "two"}, {"text": "three"}]
        })))
        .unwrap();
        let keys: Vec<_> = content.block_map().keys().cloned().collect();
        assert_eq!(keys, ["b1", "b0", "b2"]);
    }

    #[test]
    fn nested_children_become_tree_blocks() {
        let content = from_raw(&raw(json!({
            "blocks": [
                {"key": "list", "type": "ordered-list-item", "children": [
                    {"key": "x", "text": "X", "children": []},
                    {"key": "y", "text": "Y", "children": []}
                ]},
                {"key": "z", "text": "Z", "children": []}
            ]
        })))
        .unwrap();
        assert!(content.is_tree());
        assert_eq!(content.block_map().keys().cloned().collect::<Vec<_>>(), ["list", "x", "y", "z"]);
        let y = content.block_for_key("y").unwrap();
        assert_eq!(y.parent_key(), Some("list"));
        assert_eq!(y.prev_sibling_key(), Some("x"));
        assert_eq!(content.block_for_key("list").unwrap().next_sibling_key(), Some("z"));
        folio_model::validate_content(&content).unwrap();

        let back = to_raw(&content).unwrap();
        assert_eq!(back.blocks.len(), 2);
        assert_eq!(back.blocks[0].children.as_ref().map(Vec::len), Some(2));
        assert_eq!(from_raw(&back).unwrap().block_map(), content.block_map());
    }

    #[test]
    fn bad_ranges_and_entities_are_rejected() {
        let err = from_raw(&raw(json!({
            "blocks": [{"key": "a", "text": "ab", "inlineStyleRanges": [{"offset": 1, "length": 5, "style": "X"}]}]
        })))
        .unwrap_err();
        assert!(matches!(err, RawError::RangeOutOfBounds { kind: "style", .. }));

        let err = from_raw(&raw(json!({
            "blocks": [{"key": "a", "text": "ab", "entityRanges": [{"offset": 0, "length": 1, "key": 3}]}]
        })))
        .unwrap_err();
        assert_eq!(err, RawError::UnknownEntity { block: "a".into(), key: 3 });

        assert_eq!(from_raw(&raw(json!({"blocks": []}))).unwrap_err(), RawError::NoBlocks);
    }

    #[test]
    fn block_fields_survive_round_trip() {
        let content = from_raw(&raw(json!({
            "blocks": [{"key": "h", "type": "header-two", "text": "Title", "depth": 1, "data": {"id": 7}}]
        })))
        .unwrap();
        let block = content.block_for_key("h").unwrap();
        assert_eq!(block.block_type(), &BlockType::HeaderTwo);
        assert_eq!(block.depth(), 1);
        assert_eq!(block.data().get("id"), Some(&json!(7)));
        assert_eq!(content.selection_after(), &SelectionState::create_empty("h"));

        let back = to_raw(&content).unwrap();
        assert_eq!(back.blocks[0].data.get("id"), Some(&json!(7)));
        assert!(back.blocks[0].children.is_none());
    }
}
