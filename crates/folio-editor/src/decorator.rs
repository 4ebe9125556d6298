//! Decorators mark spans of block text (links, mentions, hashtags) so a
//! renderer can wrap them. The engine only needs the spans: they split the
//! block tree into decorator ranges, and offset keys index into it.

use folio_model::{Block, ContentState};

/// Assigns a decorator key to every code unit of a block, or `None`.
pub trait Decorator: Send + Sync {
    fn decorations(&self, block: &Block, content: &ContentState) -> Vec<Option<String>>;
}

/// Reports the `[start, end)` spans one decorator wants in a block.
pub trait DecoratorStrategy: Send + Sync {
    fn find(&self, block: &Block, content: &ContentState, found: &mut dyn FnMut(usize, usize));
}

impl<F> DecoratorStrategy for F
where
    F: Fn(&Block, &ContentState, &mut dyn FnMut(usize, usize)) + Send + Sync,
{
    fn find(&self, block: &Block, content: &ContentState, found: &mut dyn FnMut(usize, usize)) {
        self(block, content, found)
    }
}

/// Spans of characters whose entity has the given type.
#[derive(Debug, Clone)]
pub struct EntityTypeStrategy {
    entity_type: String,
}

impl EntityTypeStrategy {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
        }
    }
}

impl DecoratorStrategy for EntityTypeStrategy {
    fn find(&self, block: &Block, content: &ContentState, found: &mut dyn FnMut(usize, usize)) {
        let ranges = block.find_entity_ranges(|entity| {
            entity
                .and_then(|key| content.entity_map().try_get(key))
                .is_some_and(|e| e.entity_type == self.entity_type)
        });
        for range in ranges {
            found(range.start, range.end);
        }
    }
}

/// Runs strategies in order; a span is taken only if none of its code
/// units is already decorated. Keys are `<strategyIndex>.<matchIndex>`.
#[derive(Default)]
pub struct CompositeDecorator {
    strategies: Vec<Box<dyn DecoratorStrategy>>,
}

impl CompositeDecorator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, strategy: impl DecoratorStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Decorator for CompositeDecorator {
    fn decorations(&self, block: &Block, content: &ContentState) -> Vec<Option<String>> {
        let mut slots: Vec<Option<String>> = vec![None; block.len()];
        for (index, strategy) in self.strategies.iter().enumerate() {
            let mut counter = 0usize;
            strategy.find(block, content, &mut |start, end| {
                if start >= end || end > slots.len() {
                    return;
                }
                if slots[start..end].iter().any(Option::is_some) {
                    return;
                }
                let key = format!("{index}.{counter}");
                for slot in &mut slots[start..end] {
                    *slot = Some(key.clone());
                }
                counter += 1;
            });
        }
        slots
    }
}

impl std::fmt::Debug for CompositeDecorator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeDecorator")
            .field("strategies", &self.strategies.len())
            .finish()
    }
}
