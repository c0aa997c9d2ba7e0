//! Insertion ordered, identity keyed element storage.
//!
//! Removal leaves a tombstone so lookups and removals stay O(1); the slot
//! vector is compacted once tombstones outnumber live entries.

use fennec_contracts::element::Element;
use fennec_model::{ElementId, ElementKey};
use rand::Rng;
use std::collections::HashMap;

const COMPACTION_MIN_SLOTS: usize = 32;

#[derive(Debug, Clone)]
struct Slot<E> {
    key: ElementKey,
    element: E,
}

#[derive(Debug, Clone)]
pub struct IdentifiedArray<E: Element> {
    slots: Vec<Option<Slot<E>>>,
    index: HashMap<ElementKey, usize>,
    live: usize,
    next_anonymous: u64,
}

impl<E: Element> Default for IdentifiedArray<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> IdentifiedArray<E> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            live: 0,
            next_anonymous: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Append every element whose identity is not already present, keeping
    /// batch order. Existing entries win; duplicates are skipped, never
    /// overwritten. Returns how many elements were inserted.
    pub fn append<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = E>,
    {
        let mut inserted = 0;
        for element in batch {
            let key = match element.element_id() {
                Some(id) => ElementKey::Id(id.clone()),
                None => {
                    let key = ElementKey::Anonymous(self.next_anonymous);
                    self.next_anonymous += 1;
                    key
                }
            };

            if self.index.contains_key(&key) {
                continue;
            }

            self.index.insert(key.clone(), self.slots.len());
            self.slots.push(Some(Slot { key, element }));
            self.live += 1;
            inserted += 1;
        }
        inserted
    }

    pub fn remove_all(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.live = 0;
    }

    pub fn remove(&mut self, id: &ElementId) -> Option<E> {
        let position = self.index.remove(&ElementKey::Id(id.clone()))?;
        let slot = self.slots.get_mut(position)?.take()?;
        self.live -= 1;
        self.maybe_compact();
        Some(slot.element)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.index.contains_key(&ElementKey::Id(id.clone()))
    }

    pub fn get(&self, id: &ElementId) -> Option<&E> {
        let position = *self.index.get(&ElementKey::Id(id.clone()))?;
        self.slots[position].as_ref().map(|slot| &slot.element)
    }

    /// Mutate an element in place without disturbing its position.
    pub fn update<R>(&mut self, id: &ElementId, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        let position = *self.index.get(&ElementKey::Id(id.clone()))?;
        self.slots[position].as_mut().map(|slot| f(&mut slot.element))
    }

    /// Uniform pick over the currently held elements.
    pub fn random_element<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&E> {
        if self.live == 0 {
            return None;
        }
        loop {
            let position = rng.random_range(0..self.slots.len());
            if let Some(slot) = &self.slots[position] {
                return Some(&slot.element);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|slot| &slot.element))
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.iter()
            .filter_map(|element| element.element_id().cloned())
            .collect()
    }

    pub fn to_vec(&self) -> Vec<E> {
        self.iter().cloned().collect()
    }

    fn maybe_compact(&mut self) {
        if self.slots.len() < COMPACTION_MIN_SLOTS || self.live * 2 >= self.slots.len() {
            return;
        }

        let slots = std::mem::take(&mut self.slots);
        self.slots = slots.into_iter().flatten().map(Some).collect();
        self.index.clear();
        for (position, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                self.index.insert(slot.key.clone(), position);
            }
        }
    }
}

impl<E: Element> FromIterator<E> for IdentifiedArray<E> {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        let mut array = IdentifiedArray::new();
        array.append(iter);
        array
    }
}
