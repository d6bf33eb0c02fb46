//! The character's authoritative record of every container ever seen.

use std::collections::BTreeMap;

use crate::item::ContainerKey;
use crate::state::ContainerState;

/// Mapping from container key to persisted container state.
///
/// Owned exclusively by the coordinator and replicated in full to the owning
/// client. At most one entry per key; entries survive container close and
/// forced close — only the live instance goes away, never the record.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerRegistry {
    entries: BTreeMap<ContainerKey, ContainerState>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-update by the state's own key.
    pub fn upsert(&mut self, state: ContainerState) {
        self.entries.insert(state.key().clone(), state);
    }

    /// Read path; rejects keys that fail the container-key shape check.
    pub fn get(&self, key: &ContainerKey) -> Option<&ContainerState> {
        if !key.is_well_formed() {
            return None;
        }
        self.entries.get(key)
    }

    pub fn contains(&self, key: &ContainerKey) -> bool {
        self.get(key).is_some()
    }

    /// Keys of all containers at the given nesting depth.
    ///
    /// Nesting is disallowed, so every persisted key is top-level and depths
    /// above zero are empty. Kept keyed by depth because the restore walk is
    /// specified per-level.
    pub fn keys_at_depth(&self, depth: usize) -> Vec<ContainerKey> {
        if depth > 0 {
            return Vec::new();
        }
        self.entries.keys().cloned().collect()
    }

    /// Registry-wide carried weight: every persisted container plus its
    /// contents, independent of which containers are currently live.
    pub fn total_weight(&self) -> f32 {
        self.entries.values().map(ContainerState::total_weight).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContainerKey, &ContainerState)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemDescriptor, ItemKind};

    fn saved_bag(id: &str, slots: usize) -> ContainerState {
        ContainerState::new(ItemDescriptor::container(id, id, 2.0, slots, 0.0)).unwrap()
    }

    #[test]
    fn upsert_replaces_existing_entry() {
        let mut registry = ContainerRegistry::new();
        registry.upsert(saved_bag("bag1", 4));

        let mut updated = saved_bag("bag1", 4);
        let potion = ItemDescriptor::new("potion", "Potion", ItemKind::Consumable, 0.5, 20);
        updated.slot_mut(0).unwrap().set(potion, 3);
        registry.upsert(updated.clone());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(updated.key()), Some(&updated));
    }

    #[test]
    fn get_rejects_malformed_keys() {
        let mut registry = ContainerRegistry::new();
        registry.upsert(saved_bag("bag1", 4));
        assert!(registry.get(&ContainerKey::from_raw("bag1")).is_none());
        assert!(registry.get(&ContainerKey::for_item(&"bag1".into())).is_some());
    }

    #[test]
    fn all_keys_are_top_level() {
        let mut registry = ContainerRegistry::new();
        registry.upsert(saved_bag("bag1", 4));
        registry.upsert(saved_bag("bag2", 8));
        assert_eq!(registry.keys_at_depth(0).len(), 2);
        assert!(registry.keys_at_depth(1).is_empty());
    }

    #[test]
    fn total_weight_covers_all_entries() {
        let mut registry = ContainerRegistry::new();
        let mut bag = saved_bag("bag1", 4);
        let rope = ItemDescriptor::new("rope", "Rope", ItemKind::General, 1.5, 5);
        bag.slot_mut(1).unwrap().set(rope, 2);
        registry.upsert(bag);
        registry.upsert(saved_bag("bag2", 8));

        // (2.0 + 3.0) + 2.0
        assert!((registry.total_weight() - 7.0).abs() < 1.0e-4);
    }
}
