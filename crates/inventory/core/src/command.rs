//! Slot commands and their validation.
//!
//! [`SlotCommand`] is the request vocabulary clients use to rearrange a
//! container. Commands validate against the current state and resolve to the
//! primitive slot writes on [`ContainerInstance`]; raw writes like
//! [`ContainerInstance::try_add_item`] overwrite unconditionally, so anything
//! client-driven should come through here instead.

use crate::instance::ContainerInstance;
use crate::item::{ItemDescriptor, ItemId, ItemKind};
use crate::state::{ContainerRegistry, ContainerState};

/// A client request to rearrange one container.
///
/// Quantities transferred by `Move`, `Split`, and `Merge` are clamped to the
/// destination's stack space; whatever does not fit stays in the source.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlotCommand {
    /// Place `quantity` of `item`. Without an explicit target the slot is
    /// chosen by [`find_or_create_slot_index`](ContainerInstance::find_or_create_slot_index).
    Add {
        item: ItemDescriptor,
        quantity: u32,
        target_slot: Option<usize>,
    },
    /// Remove `quantity` units, or the whole stack when `None`.
    Remove { slot: usize, quantity: Option<u32> },
    /// Move a stack. Same-item destinations merge; different items swap.
    Move { from: usize, to: usize },
    /// Move part of a stack into an empty or same-item slot. `quantity`
    /// must leave at least one unit behind; splitting off the whole stack
    /// is a [`Move`](Self::Move).
    Split { from: usize, to: usize, quantity: u32 },
    /// Combine two stacks of the same item.
    Merge { from: usize, to: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandError {
    #[error("slot index {index} is out of range")]
    SlotOutOfRange { index: usize },

    #[error("slot {index} is empty")]
    SlotEmpty { index: usize },

    #[error("slot {index} holds a different item")]
    ItemMismatch { index: usize },

    #[error("containers cannot be placed inside containers")]
    NestingForbidden,

    #[error("no slot can accept {item}")]
    NoSpace { item: ItemId },

    #[error("quantity must be greater than zero")]
    ZeroQuantity,

    #[error("a split must leave part of the stack in slot {index}")]
    SplitTooLarge { index: usize },

    #[error("source and destination are both slot {index}")]
    SameSlot { index: usize },
}

impl SlotCommand {
    /// Validates and executes the command against `instance`, persisting
    /// through `registry`. The state is untouched when an error is returned.
    pub fn apply(
        self,
        instance: &mut ContainerInstance,
        registry: &mut ContainerRegistry,
    ) -> Result<(), CommandError> {
        match self {
            Self::Add {
                item,
                quantity,
                target_slot,
            } => apply_add(instance, registry, item, quantity, target_slot),
            Self::Remove { slot, quantity } => apply_remove(instance, registry, slot, quantity),
            Self::Move { from, to } => apply_move(instance, registry, from, to),
            Self::Split { from, to, quantity } => {
                apply_split(instance, registry, from, to, quantity)
            }
            Self::Merge { from, to } => apply_merge(instance, registry, from, to),
        }
    }
}

fn apply_add(
    instance: &mut ContainerInstance,
    registry: &mut ContainerRegistry,
    item: ItemDescriptor,
    quantity: u32,
    target_slot: Option<usize>,
) -> Result<(), CommandError> {
    if quantity == 0 {
        return Err(CommandError::ZeroQuantity);
    }
    if item.kind == ItemKind::Container {
        return Err(CommandError::NestingForbidden);
    }

    let index = match target_slot {
        Some(index) => index,
        None => instance
            .find_or_create_slot_index(&item)
            .ok_or(CommandError::NoSpace {
                item: item.id.clone(),
            })?,
    };

    let max_stack = item.max_stack_size.max(1);
    let state = instance.state_mut();
    let Some(slot) = state.slot_mut(index) else {
        return Err(CommandError::SlotOutOfRange { index });
    };

    let merging = match slot.item() {
        None => false,
        Some(existing) if existing.id == item.id => true,
        Some(_) => return Err(CommandError::ItemMismatch { index }),
    };

    if merging {
        let merged = slot.quantity().saturating_add(quantity).min(max_stack);
        slot.set_quantity(merged);
    } else {
        slot.set(item, quantity.min(max_stack));
    }

    instance.commit(registry, &[index]);
    Ok(())
}

fn apply_remove(
    instance: &mut ContainerInstance,
    registry: &mut ContainerRegistry,
    index: usize,
    quantity: Option<u32>,
) -> Result<(), CommandError> {
    let state = instance.state_mut();
    let Some(slot) = state.slot_mut(index) else {
        return Err(CommandError::SlotOutOfRange { index });
    };
    if slot.is_empty() {
        return Err(CommandError::SlotEmpty { index });
    }

    match quantity {
        None => slot.clear(),
        Some(0) => return Err(CommandError::ZeroQuantity),
        Some(count) => slot.set_quantity(slot.quantity().saturating_sub(count)),
    }

    instance.commit(registry, &[index]);
    Ok(())
}

fn apply_move(
    instance: &mut ContainerInstance,
    registry: &mut ContainerRegistry,
    from: usize,
    to: usize,
) -> Result<(), CommandError> {
    check_pair(instance, from, to)?;

    let state = instance.state_mut();
    let same_stack = match (state.slots()[from].item(), state.slots()[to].item()) {
        (Some(source), Some(dest)) => source.id == dest.id,
        _ => false,
    };

    if same_stack {
        // Merge as much as fits; the remainder stays in the source stack.
        let moved = state.slots()[from]
            .quantity()
            .min(state.slots()[to].stack_space());
        transfer(state, from, to, moved);
    } else {
        // Into an empty slot this is a plain move, otherwise a swap.
        state.swap_slots(from, to);
    }

    instance.commit(registry, &[from, to]);
    Ok(())
}

fn apply_split(
    instance: &mut ContainerInstance,
    registry: &mut ContainerRegistry,
    from: usize,
    to: usize,
    quantity: u32,
) -> Result<(), CommandError> {
    if quantity == 0 {
        return Err(CommandError::ZeroQuantity);
    }
    check_pair(instance, from, to)?;

    let state = instance.state_mut();
    let source_item = match state.slots()[from].item() {
        Some(item) => item.clone(),
        None => return Err(CommandError::SlotEmpty { index: from }),
    };
    if quantity >= state.slots()[from].quantity() {
        return Err(CommandError::SplitTooLarge { index: from });
    }

    let space = match state.slots()[to].item() {
        None => source_item.max_stack_size.max(1),
        Some(dest) if dest.id == source_item.id => state.slots()[to].stack_space(),
        Some(_) => return Err(CommandError::ItemMismatch { index: to }),
    };

    let moved = quantity.min(space);
    if moved == 0 {
        return Err(CommandError::NoSpace {
            item: source_item.id,
        });
    }

    if state.slots()[to].is_empty() {
        let remaining = state.slots()[from].quantity() - moved;
        if let Some(slot) = state.slot_mut(to) {
            slot.set(source_item, moved);
        }
        if let Some(slot) = state.slot_mut(from) {
            slot.set_quantity(remaining);
        }
    } else {
        transfer(state, from, to, moved);
    }

    instance.commit(registry, &[from, to]);
    Ok(())
}

fn apply_merge(
    instance: &mut ContainerInstance,
    registry: &mut ContainerRegistry,
    from: usize,
    to: usize,
) -> Result<(), CommandError> {
    check_pair(instance, from, to)?;

    let state = instance.state_mut();
    let (source, dest) = (&state.slots()[from], &state.slots()[to]);
    let item = match (source.item(), dest.item()) {
        (Some(source_item), Some(dest_item)) => {
            if source_item.id != dest_item.id {
                return Err(CommandError::ItemMismatch { index: to });
            }
            source_item.id.clone()
        }
        _ => return Err(CommandError::SlotEmpty { index: to }),
    };

    let moved = source.quantity().min(dest.stack_space());
    if moved == 0 {
        return Err(CommandError::NoSpace { item });
    }
    transfer(state, from, to, moved);

    instance.commit(registry, &[from, to]);
    Ok(())
}

/// Shared two-slot validation: distinct indices, both in range, source
/// occupied.
fn check_pair(instance: &ContainerInstance, from: usize, to: usize) -> Result<(), CommandError> {
    if from == to {
        return Err(CommandError::SameSlot { index: from });
    }
    let state = instance.state();
    for index in [from, to] {
        if !state.is_valid_index(index) {
            return Err(CommandError::SlotOutOfRange { index });
        }
    }
    if state.slots()[from].is_empty() {
        return Err(CommandError::SlotEmpty { index: from });
    }
    Ok(())
}

/// Moves `count` units between two same-item stacks. A fully drained source
/// clears itself.
fn transfer(state: &mut ContainerState, from: usize, to: usize, count: u32) {
    if count == 0 {
        return;
    }
    let remaining = state.slots()[from].quantity() - count;
    let merged = state.slots()[to].quantity() + count;
    if let Some(slot) = state.slot_mut(to) {
        slot.set_quantity(merged);
    }
    if let Some(slot) = state.slot_mut(from) {
        slot.set_quantity(remaining);
    }
}
