//! Persisted identity and contents of one container.

use crate::error::ContainerError;
use crate::item::{ContainerKey, ItemDescriptor};
use crate::state::SlotState;

/// A container's identity, descriptor, and ordered slot array.
///
/// The slot array is sized to `info.slot_count` at initialization and never
/// resized afterwards; there is deliberately no API for growing it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerState {
    key: ContainerKey,
    info: ItemDescriptor,
    slots: Vec<SlotState>,
}

impl ContainerState {
    /// Builds an empty container record for a container-type descriptor.
    pub fn new(info: ItemDescriptor) -> Result<Self, ContainerError> {
        if !info.is_container() {
            return Err(ContainerError::NotAContainer { kind: info.kind });
        }
        if !info.id.is_valid() {
            return Err(ContainerError::InvalidItemId);
        }
        let key = ContainerKey::for_item(&info.id);
        let slots = vec![SlotState::empty(); info.slot_count];
        Ok(Self { key, info, slots })
    }

    /// Re-derives identity from `info`, allocating the slot array only if it
    /// has not been sized yet. Re-initializing with the same descriptor
    /// leaves existing slot contents untouched.
    pub(crate) fn reinitialize(&mut self, info: ItemDescriptor) {
        self.key = ContainerKey::for_item(&info.id);
        if self.slots.len() != info.slot_count {
            self.slots = vec![SlotState::empty(); info.slot_count];
        }
        self.info = info;
    }

    pub fn key(&self) -> &ContainerKey {
        &self.key
    }

    pub fn info(&self) -> &ItemDescriptor {
        &self.info
    }

    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&SlotState> {
        self.slots.get(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut SlotState> {
        self.slots.get_mut(index)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_valid_index(&self, index: usize) -> bool {
        index < self.slots.len()
    }

    /// Single left-to-right pass picking a destination slot for `item`: a
    /// partially filled stack of the same item wins immediately, otherwise
    /// the first empty slot seen is used. `None` when the container is full.
    pub fn find_or_create_slot_index(&self, item: &ItemDescriptor) -> Option<usize> {
        let mut first_empty = None;
        for (index, slot) in self.slots.iter().enumerate() {
            match slot.item() {
                Some(existing) if existing.id == item.id && slot.stack_space() > 0 => {
                    return Some(index);
                }
                None if first_empty.is_none() => first_empty = Some(index),
                _ => {}
            }
        }
        first_empty
    }

    pub(crate) fn swap_slots(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    /// Weight of the contents, excluding the container's own weight.
    pub fn contents_weight(&self) -> f32 {
        self.slots.iter().map(SlotState::weight).sum()
    }

    /// Container weight plus contents weight.
    pub fn total_weight(&self) -> f32 {
        self.info.weight + self.contents_weight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;

    fn bag() -> ItemDescriptor {
        ItemDescriptor::container("bag1", "Leather Bag", 2.0, 4, 0.0)
    }

    #[test]
    fn rejects_non_container_descriptors() {
        let sword = ItemDescriptor::new("sword", "Sword", ItemKind::Equipment, 5.0, 1);
        assert_eq!(
            ContainerState::new(sword),
            Err(ContainerError::NotAContainer {
                kind: ItemKind::Equipment
            })
        );
        assert_eq!(
            ContainerState::new(ItemDescriptor::container("", "Bag", 1.0, 4, 0.0)),
            Err(ContainerError::InvalidItemId)
        );
    }

    #[test]
    fn slot_array_matches_descriptor() {
        let state = ContainerState::new(bag()).unwrap();
        assert_eq!(state.slot_count(), 4);
        assert!(state.slots().iter().all(SlotState::is_empty));
        assert_eq!(state.key().as_str(), "Bag_bag1");
    }

    #[test]
    fn weight_sums_occupied_slots_in_any_order() {
        let potion = ItemDescriptor::new("potion", "Potion", ItemKind::Consumable, 0.5, 20);
        let rope = ItemDescriptor::new("rope", "Rope", ItemKind::General, 1.5, 5);

        let mut a = ContainerState::new(bag()).unwrap();
        a.slot_mut(0).unwrap().set(potion.clone(), 4);
        a.slot_mut(2).unwrap().set(rope.clone(), 2);

        let mut b = ContainerState::new(bag()).unwrap();
        b.slot_mut(3).unwrap().set(potion, 4);
        b.slot_mut(1).unwrap().set(rope, 2);

        // 2.0 + 0.5*4 + 1.5*2 = 7.0, regardless of slot placement
        assert!((a.total_weight() - 7.0).abs() < 1.0e-4);
        assert!((a.total_weight() - b.total_weight()).abs() < 1.0e-4);
    }

    #[test]
    fn slot_search_prefers_partial_stacks_over_empties() {
        let potion = ItemDescriptor::new("potion", "Potion", ItemKind::Consumable, 0.5, 20);
        let rope = ItemDescriptor::new("rope", "Rope", ItemKind::General, 1.5, 5);

        let mut state = ContainerState::new(bag()).unwrap();
        assert_eq!(state.find_or_create_slot_index(&potion), Some(0));

        // Empty slot 0 sits before the partial stack in slot 2, but the
        // stack still wins.
        state.slot_mut(2).unwrap().set(potion.clone(), 5);
        assert_eq!(state.find_or_create_slot_index(&potion), Some(2));

        // A full stack no longer attracts; fall back to the first empty.
        state.slot_mut(2).unwrap().set(potion.clone(), 20);
        assert_eq!(state.find_or_create_slot_index(&potion), Some(0));

        // Different item ignores the potion stack entirely.
        assert_eq!(state.find_or_create_slot_index(&rope), Some(0));

        for index in [0, 1, 3] {
            state.slot_mut(index).unwrap().set(rope.clone(), 5);
        }
        assert_eq!(state.find_or_create_slot_index(&potion), None);
    }
}
