//! Entities and the append-only entity store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::Result;

/// Key of an entity instance. Issued in increasing order by [`EntityMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(pub u64);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How text covered by an entity behaves under partial edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutability {
    /// Text can be edited freely; the entity stays attached.
    Mutable,
    /// Text is atomic: touching any character removes the whole range.
    Immutable,
    /// Text is removed one separator-delimited segment at a time.
    Segmented,
}

impl Mutability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Mutability::Mutable => "MUTABLE",
            Mutability::Immutable => "IMMUTABLE",
            Mutability::Segmented => "SEGMENTED",
        }
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, addressable piece of metadata referenced by characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInstance {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mutability: Mutability,
    #[serde(default = "empty_data")]
    pub data: Value,
}

fn empty_data() -> Value {
    Value::Object(Map::new())
}

impl EntityInstance {
    pub fn new(entity_type: impl Into<String>, mutability: Mutability, data: Value) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability,
            data,
        }
    }
}

/// Append-only store of entity instances.
///
/// Every snapshot carries its own `EntityMap` value. Adding an entity or
/// rewriting its data returns a new map; maps held by older snapshots never
/// observe the change, and unchanged maps share storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityMap {
    entries: Arc<BTreeMap<EntityKey, Arc<EntityInstance>>>,
    last: u64,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance under the next key.
    pub fn add(&self, instance: EntityInstance) -> (EntityMap, EntityKey) {
        let key = EntityKey(self.last + 1);
        let mut entries = (*self.entries).clone();
        entries.insert(key, Arc::new(instance));
        let map = EntityMap {
            entries: Arc::new(entries),
            last: key.0,
        };
        (map, key)
    }

    pub fn create(
        &self,
        entity_type: impl Into<String>,
        mutability: Mutability,
        data: Value,
    ) -> (EntityMap, EntityKey) {
        self.add(EntityInstance::new(entity_type, mutability, data))
    }

    /// Look up an entity. A missing key is an invariant violation.
    pub fn get(&self, key: EntityKey) -> Result<&EntityInstance> {
        self.entries
            .get(&key)
            .map(Arc::as_ref)
            .ok_or(ModelError::UnknownEntity(key))
    }

    pub fn try_get(&self, key: EntityKey) -> Option<&EntityInstance> {
        self.entries.get(&key).map(Arc::as_ref)
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Shallow-merge `data` into the entity's object data.
    pub fn merge_data(&self, key: EntityKey, data: Map<String, Value>) -> Result<EntityMap> {
        let current = self.get(key)?;
        let mut merged = match &current.data {
            Value::Object(existing) => existing.clone(),
            _ => Map::new(),
        };
        merged.extend(data);
        self.replace_data(key, Value::Object(merged))
    }

    /// Replace the entity's data wholesale. The key does not change.
    pub fn replace_data(&self, key: EntityKey, data: Value) -> Result<EntityMap> {
        let current = self.get(key)?;
        let updated = EntityInstance {
            data,
            ..current.clone()
        };
        let mut entries = (*self.entries).clone();
        entries.insert(key, Arc::new(updated));
        Ok(EntityMap {
            entries: Arc::new(entries),
            last: self.last,
        })
    }

    pub fn last_key(&self) -> Option<EntityKey> {
        (self.last > 0).then_some(EntityKey(self.last))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entities in key order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &EntityInstance)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    /// True when both maps share the same storage.
    pub fn same_storage(&self, other: &EntityMap) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}
