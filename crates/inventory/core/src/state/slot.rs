//! A single inventory cell.

use crate::item::ItemDescriptor;

/// One fixed storage cell holding at most one item stack.
///
/// Invariant: `quantity == 0` iff the slot is empty iff no descriptor is
/// stored. Stack-size clamping is the caller's responsibility (the command
/// layer computes transferable amounts before writing).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotState {
    item: Option<ItemDescriptor>,
    quantity: u32,
}

impl SlotState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds an occupied slot. A zero quantity yields an empty slot.
    pub fn occupied(item: ItemDescriptor, quantity: u32) -> Self {
        let mut slot = Self::empty();
        slot.set(item, quantity);
        slot
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    pub fn item(&self) -> Option<&ItemDescriptor> {
        self.item.as_ref()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Overwrites the slot contents. Quantity zero clears instead.
    pub fn set(&mut self, item: ItemDescriptor, quantity: u32) {
        if quantity == 0 {
            self.clear();
        } else {
            debug_assert!(
                quantity <= item.max_stack_size,
                "stack of {} exceeds max {}",
                quantity,
                item.max_stack_size
            );
            self.item = Some(item);
            self.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.item = None;
        self.quantity = 0;
    }

    /// Remaining capacity before the stack limit; zero when empty slots
    /// should be treated separately by the caller.
    pub fn stack_space(&self) -> u32 {
        match &self.item {
            Some(item) => item.max_stack_size.saturating_sub(self.quantity),
            None => 0,
        }
    }

    /// Adjusts the quantity in place, clearing the slot when it reaches zero.
    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        if quantity == 0 {
            self.clear();
        } else {
            self.quantity = quantity;
        }
    }

    /// Contribution of this slot to its container's weight.
    pub fn weight(&self) -> f32 {
        match &self.item {
            Some(item) => item.weight * self.quantity as f32,
            None => 0.0,
        }
    }
}
