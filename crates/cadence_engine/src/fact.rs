//! Working memory: facts keyed by `(entity, attribute)`.
//!
//! A fact is uniquely identified by its entity and attribute. Inserting the
//! same pair again replaces the value and keeps the fact's enumeration
//! position, so re-assertion is an update rather than a duplicate.

use cadence_foundation::{EntityId, Keyword, PMap, POrdMap, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Fact
// =============================================================================

/// An `(entity, attribute, value)` triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fact {
    /// The entity the fact describes.
    pub entity: EntityId,
    /// The attribute being asserted.
    pub attribute: Keyword,
    /// The asserted value.
    pub value: Value,
}

impl Fact {
    /// Creates a new fact.
    #[must_use]
    pub fn new(entity: EntityId, attribute: impl Into<Keyword>, value: impl Into<Value>) -> Self {
        Self {
            entity,
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Fact Store
// =============================================================================

#[derive(Clone, Debug)]
struct Entry {
    seq: u64,
    value: Value,
}

/// Persistent fact storage.
///
/// Cloning is O(1). Enumeration follows first-insertion order, which is
/// also the order pattern matches are produced in.
#[derive(Clone, Debug, Default)]
pub struct FactStore {
    /// Current value and enumeration position per fact.
    entries: PMap<(EntityId, Keyword), Entry>,
    /// Enumeration order.
    order: POrdMap<u64, (EntityId, Keyword)>,
    /// Attribute index: attribute -> (position -> entity).
    by_attribute: PMap<Keyword, POrdMap<u64, EntityId>>,
    /// Next enumeration position.
    next_seq: u64,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value of a fact, if present.
    #[must_use]
    pub fn get(&self, entity: EntityId, attribute: &Keyword) -> Option<&Value> {
        self.entries
            .get(&(entity, attribute.clone()))
            .map(|entry| &entry.value)
    }

    /// Returns true if a fact exists for the pair.
    #[must_use]
    pub fn contains(&self, entity: EntityId, attribute: &Keyword) -> bool {
        self.entries.contains_key(&(entity, attribute.clone()))
    }

    /// Returns a new store with the fact inserted or updated.
    #[must_use]
    pub fn insert(&self, entity: EntityId, attribute: Keyword, value: Value) -> Self {
        let key = (entity, attribute.clone());
        if let Some(existing) = self.entries.get(&key) {
            let entry = Entry {
                seq: existing.seq,
                value,
            };
            return Self {
                entries: self.entries.insert(key, entry),
                ..self.clone()
            };
        }

        let seq = self.next_seq;
        let index = self
            .by_attribute
            .get(&attribute)
            .cloned()
            .unwrap_or_default()
            .insert(seq, entity);

        Self {
            entries: self.entries.insert(key.clone(), Entry { seq, value }),
            order: self.order.insert(seq, key),
            by_attribute: self.by_attribute.insert(attribute, index),
            next_seq: seq + 1,
        }
    }

    /// Returns a new store with the fact removed.
    ///
    /// Retracting an absent fact returns an identical store.
    #[must_use]
    pub fn retract(&self, entity: EntityId, attribute: &Keyword) -> Self {
        let key = (entity, attribute.clone());
        let Some(existing) = self.entries.get(&key) else {
            return self.clone();
        };
        let seq = existing.seq;

        let by_attribute = match self.by_attribute.get(attribute) {
            Some(index) => {
                let index = index.remove(&seq);
                if index.is_empty() {
                    self.by_attribute.remove(attribute)
                } else {
                    self.by_attribute.insert(attribute.clone(), index)
                }
            }
            None => self.by_attribute.clone(),
        };

        Self {
            entries: self.entries.remove(&key),
            order: self.order.remove(&seq),
            by_attribute,
            next_seq: self.next_seq,
        }
    }

    /// Iterates all facts in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = Fact> + '_ {
        self.order.values().filter_map(|(entity, attribute)| {
            self.get(*entity, attribute).map(|value| Fact {
                entity: *entity,
                attribute: attribute.clone(),
                value: value.clone(),
            })
        })
    }

    /// Iterates `(entity, value)` for every fact with the attribute, in
    /// enumeration order.
    pub fn with_attribute<'a>(
        &'a self,
        attribute: &'a Keyword,
    ) -> impl Iterator<Item = (EntityId, &'a Value)> + 'a {
        self.by_attribute
            .get(attribute)
            .into_iter()
            .flat_map(|index| index.values())
            .filter_map(move |entity| self.get(*entity, attribute).map(|v| (*entity, v)))
    }
}

// =============================================================================
// Tests
// =============================================================================
