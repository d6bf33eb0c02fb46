//! Live container instances.
//!
//! A [`ContainerInstance`] is the only object permitted to mutate slot
//! contents. It wraps one [`ContainerState`], layers transient bookkeeping on
//! top (open flag, reentrancy guards, debounce timers), and pushes every
//! mutation back into the [`ContainerRegistry`] before notifying observers.
//! Instances are created and owned by the coordinator; they are views over
//! persisted state and are never themselves persisted.

use std::sync::Arc;

use bitflags::bitflags;

use crate::config::{InventoryConfig, ReopenPolicy};
use crate::error::ContainerError;
use crate::events::{ContainerListener, ListenerSet};
use crate::item::{ContainerKey, ItemDescriptor, ItemKind};
use crate::state::{ContainerRegistry, ContainerState, SlotState};
use crate::timer::{DebounceTimer, Tick};

bitflags! {
    /// Transient guard flags; none of these are user-visible states.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InstanceFlags: u8 {
        /// The container is open (UI attached, slots announced).
        const OPEN             = 1 << 0;
        /// Save cooldown armed; further saves are skipped until it expires.
        const SAVING           = 1 << 1;
        /// Close in progress; re-entrant close calls bail out.
        const CLOSING          = 1 << 2;
        /// Weight recompute in progress.
        const UPDATING_WEIGHT  = 1 << 3;
        /// Saves triggered by notification side effects are skipped.
        const SUPPRESS_SAVE    = 1 << 4;
        /// A mutation landed during a weight recompute; one more pass is due.
        const PENDING_WEIGHT   = 1 << 5;
        /// Force-closed; the coordinator must detach this instance.
        const PENDING_REMOVAL  = 1 << 6;
    }
}

/// Identity of a live instance, distinct from its container key.
///
/// Keys repeat when a container is detached and later recreated; ids never
/// do. Stale removal requests are matched against the id so they cannot
/// evict a newer instance that reused the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceId(pub u64);

/// A live, possibly-open container bound to one persisted record.
#[derive(Debug)]
pub struct ContainerInstance {
    id: InstanceId,
    state: ContainerState,
    flags: InstanceFlags,
    last_weight: f32,
    clock: Tick,
    save_cooldown: DebounceTimer,
    weight_timer: DebounceTimer,
    listeners: ListenerSet,
    config: InventoryConfig,
}

impl ContainerInstance {
    pub fn new(
        id: InstanceId,
        info: ItemDescriptor,
        config: InventoryConfig,
    ) -> Result<Self, ContainerError> {
        let state = ContainerState::new(info)?;
        Ok(Self {
            id,
            state,
            flags: InstanceFlags::empty(),
            last_weight: 0.0,
            clock: Tick(0),
            save_cooldown: DebounceTimer::new(config.save_cooldown_ms),
            weight_timer: DebounceTimer::new(config.weight_debounce_ms),
            listeners: ListenerSet::new(),
            config,
        })
    }

    // === Accessors ===

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn key(&self) -> &ContainerKey {
        self.state.key()
    }

    pub fn info(&self) -> &ItemDescriptor {
        self.state.info()
    }

    pub fn state(&self) -> &ContainerState {
        &self.state
    }

    pub fn slot_states(&self) -> &[SlotState] {
        self.state.slots()
    }

    pub fn slot_count(&self) -> usize {
        self.state.slot_count()
    }

    pub fn is_open(&self) -> bool {
        self.flags.contains(InstanceFlags::OPEN)
    }

    pub fn is_pending_removal(&self) -> bool {
        self.flags.contains(InstanceFlags::PENDING_REMOVAL)
    }

    pub fn last_calculated_weight(&self) -> f32 {
        self.last_weight
    }

    pub fn register_listener(&mut self, listener: Arc<dyn ContainerListener>) {
        self.listeners.register(listener);
    }

    // === Lifecycle ===

    /// Rebinds the instance to `info`, allocating slots only when the
    /// backing state has none yet. Idempotent for a matching descriptor:
    /// existing slot contents are left untouched.
    pub fn initialize(
        &mut self,
        info: ItemDescriptor,
        registry: &mut ContainerRegistry,
    ) -> Result<(), ContainerError> {
        if !info.is_container() {
            return Err(ContainerError::NotAContainer { kind: info.kind });
        }
        if !info.id.is_valid() {
            return Err(ContainerError::InvalidItemId);
        }
        self.state.reinitialize(info);
        self.save_state(registry);
        Ok(())
    }

    /// Opens the container, re-announcing every slot on the transition so a
    /// freshly attached view can rebuild itself.
    ///
    /// Opening an already-open instance follows
    /// [`ReopenPolicy`](crate::config::ReopenPolicy): the default (`Ignore`)
    /// is a successful no-op; `ForceReopen` closes (persisting state) and
    /// goes through the open transition again.
    pub fn open(&mut self, registry: &mut ContainerRegistry) -> bool {
        if !self.state.info().id.is_valid() {
            return false;
        }

        if self.is_open() {
            match self.config.reopen_policy {
                ReopenPolicy::Ignore => return true,
                ReopenPolicy::ForceReopen => self.close(registry),
            }
        }

        self.flags.insert(InstanceFlags::OPEN);
        for index in 0..self.state.slot_count() {
            self.notify_slot_updated(index);
        }
        self.request_weight_update();
        self.listeners.notify_opened(self.state.key());
        true
    }

    /// Persists state and transitions to closed.
    ///
    /// Any pending debounced weight recompute runs first and the final save
    /// bypasses the save cooldown, so in-flight debounced writes are never
    /// dropped by a close.
    pub fn close(&mut self, registry: &mut ContainerRegistry) {
        if self
            .flags
            .intersects(InstanceFlags::CLOSING | InstanceFlags::PENDING_REMOVAL)
        {
            return;
        }

        self.flags.insert(InstanceFlags::CLOSING);
        self.flush_pending(registry);
        self.flags.remove(InstanceFlags::OPEN);
        self.listeners.notify_closed(self.state.key());
        self.flags.remove(InstanceFlags::CLOSING);
    }

    /// Like [`close`](Self::close), but additionally marks the instance for
    /// detachment from the coordinator's live map. The persisted record
    /// stays in the registry.
    pub fn force_close(&mut self, registry: &mut ContainerRegistry) {
        if self
            .flags
            .intersects(InstanceFlags::CLOSING | InstanceFlags::PENDING_REMOVAL)
        {
            return;
        }

        self.flags.insert(InstanceFlags::CLOSING);
        self.flush_pending(registry);
        self.flags.remove(InstanceFlags::OPEN);
        self.listeners.notify_closed(self.state.key());
        self.flags.remove(InstanceFlags::CLOSING);
        self.flags.insert(InstanceFlags::PENDING_REMOVAL);
    }

    // === Slot mutation ===

    /// Whether `item` may be placed into `target_slot`: containers never
    /// nest, and the index must be in range.
    pub fn can_accept_item(&self, item: &ItemDescriptor, target_slot: usize) -> bool {
        if item.kind == ItemKind::Container {
            return false;
        }
        self.state.is_valid_index(target_slot)
    }

    /// Overwrites `target_slot` with `(item, quantity)`.
    ///
    /// The slot is replaced unconditionally after [`can_accept_item`]
    /// passes; computing whether the write is a fresh placement, a merge
    /// result, or an overwrite is the caller's job (see
    /// [`SlotCommand`](crate::command::SlotCommand)). Persists before
    /// notifying.
    pub fn try_add_item(
        &mut self,
        registry: &mut ContainerRegistry,
        item: ItemDescriptor,
        quantity: u32,
        target_slot: usize,
    ) -> bool {
        if !self.can_accept_item(&item, target_slot) {
            return false;
        }

        if let Some(slot) = self.state.slot_mut(target_slot) {
            slot.set(item, quantity);
        }

        self.commit(registry, &[target_slot]);
        true
    }

    /// Clears `slot_index`. Persists before notifying.
    pub fn try_remove_item(&mut self, registry: &mut ContainerRegistry, slot_index: usize) -> bool {
        let Some(slot) = self.state.slot_mut(slot_index) else {
            return false;
        };
        slot.clear();

        self.commit(registry, &[slot_index]);
        true
    }

    /// See [`ContainerState::find_or_create_slot_index`].
    pub fn find_or_create_slot_index(&self, item: &ItemDescriptor) -> Option<usize> {
        self.state.find_or_create_slot_index(item)
    }

    // === State management ===

    /// Wholesale replacement of the backing state, used when reconciling
    /// with a registry entry. Re-announces every non-empty slot.
    pub fn load_state(&mut self, state: ContainerState) {
        self.state = state;
        for index in 0..self.state.slot_count() {
            if !self.state.slots()[index].is_empty() {
                self.notify_slot_updated(index);
            }
        }
        self.request_weight_update();
    }

    /// Pushes a copy of the current state into the registry, then arms a
    /// short cooldown so a burst of mutations in the same frame produces a
    /// single registry write.
    pub fn save_state(&mut self, registry: &mut ContainerRegistry) {
        if self
            .flags
            .intersects(InstanceFlags::SUPPRESS_SAVE | InstanceFlags::SAVING)
            || !self.state.key().is_well_formed()
        {
            return;
        }

        self.flags.insert(InstanceFlags::SAVING);
        self.save_cooldown.arm(self.clock);
        registry.upsert(self.state.clone());
    }

    /// Debounced weight recompute: cancels any pending recompute and
    /// restarts the countdown, collapsing bursts into one execution.
    pub fn request_weight_update(&mut self) {
        self.weight_timer.arm(self.clock);
    }

    /// Recomputes the container's weight and fires `weight_changed` when it
    /// moved by more than the epsilon.
    ///
    /// Reentrancy-guarded: a recompute requested while one is running is
    /// deferred to a fresh debounced pass rather than recursing. Saves are
    /// suppressed for the duration — a recompute summarizes state, it must
    /// not invalidate it.
    pub fn update_weight(&mut self) {
        if self.flags.contains(InstanceFlags::UPDATING_WEIGHT) {
            self.flags.insert(InstanceFlags::PENDING_WEIGHT);
            return;
        }

        self.flags
            .insert(InstanceFlags::UPDATING_WEIGHT | InstanceFlags::SUPPRESS_SAVE);

        let new_weight = self.state.total_weight();
        if (new_weight - self.last_weight).abs() > self.config.weight_epsilon {
            self.last_weight = new_weight;
            self.listeners
                .notify_weight_changed(self.state.key(), new_weight);
        }

        self.flags
            .remove(InstanceFlags::UPDATING_WEIGHT | InstanceFlags::SUPPRESS_SAVE);

        if self.flags.contains(InstanceFlags::PENDING_WEIGHT) {
            self.flags.remove(InstanceFlags::PENDING_WEIGHT);
            self.weight_timer.arm(self.clock);
        }
    }

    /// Advances the debounce clock: expires the save cooldown and fires any
    /// due weight recompute.
    pub fn tick(&mut self, now: Tick) {
        self.clock = now;
        if self.save_cooldown.fire(now) {
            self.flags.remove(InstanceFlags::SAVING);
        }
        if self.weight_timer.fire(now) {
            self.update_weight();
        }
    }

    pub(crate) fn state_mut(&mut self) -> &mut ContainerState {
        &mut self.state
    }

    /// Persist-then-notify pipeline shared by every slot mutation path: the
    /// registry write happens before any observer hears about the change.
    pub(crate) fn commit(&mut self, registry: &mut ContainerRegistry, touched: &[usize]) {
        self.save_state(registry);
        for &index in touched {
            self.notify_slot_updated(index);
        }
        self.request_weight_update();
    }

    fn notify_slot_updated(&self, index: usize) {
        if let Some(slot) = self.state.slot(index) {
            self.listeners
                .notify_slot_updated(self.state.key(), index, slot);
        }
    }

    /// Final synchronous flush on close: runs a due-or-armed weight
    /// recompute, then writes the registry unconditionally (cooldown
    /// bypassed) and disarms both timers.
    fn flush_pending(&mut self, registry: &mut ContainerRegistry) {
        if self.weight_timer.is_armed() {
            self.weight_timer.cancel();
            self.update_weight();
        }
        self.save_cooldown.cancel();
        self.flags.remove(InstanceFlags::SAVING);
        if self.state.key().is_well_formed() {
            registry.upsert(self.state.clone());
        }
    }
}
