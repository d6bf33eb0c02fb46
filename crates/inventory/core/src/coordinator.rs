//! Character-scoped coordination of live containers.
//!
//! The [`InventoryCoordinator`] owns the [`ContainerRegistry`] and every live
//! [`ContainerInstance`] for one character. It is the attach/detach
//! authority, the routing point for slot commands, and the aggregator that
//! folds per-container weight changes into a single carried-weight figure for
//! the movement policy.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::command::{CommandError, SlotCommand};
use crate::config::InventoryConfig;
use crate::error::{ContainerError, InventoryError};
use crate::events::{CarryWeightListener, ContainerListener};
use crate::instance::{ContainerInstance, InstanceId};
use crate::item::{ContainerKey, ItemDescriptor};
use crate::movement::{CharacterStats, MovementBaseline, MovementProfile, WeightPolicy};
use crate::state::ContainerRegistry;
use crate::timer::Tick;

/// Raises a shared flag when any container reports a weight change, so the
/// coordinator folds however many per-container updates arrive between ticks
/// into one aggregate pass.
struct AggregateDirty(Arc<AtomicBool>);

impl ContainerListener for AggregateDirty {
    fn weight_changed(&self, _key: &ContainerKey, _weight: f32) {
        self.0.store(true, Ordering::Relaxed);
    }
}

pub struct InventoryCoordinator {
    config: InventoryConfig,
    policy: WeightPolicy,
    baseline: MovementBaseline,
    stats: CharacterStats,
    registry: ContainerRegistry,
    live: BTreeMap<ContainerKey, ContainerInstance>,
    next_instance: u64,
    aggregate_dirty: Arc<AtomicBool>,
    last_total: f32,
    clock: Tick,
    carry_listeners: Vec<Arc<dyn CarryWeightListener>>,
}

impl InventoryCoordinator {
    pub fn new(config: InventoryConfig) -> Self {
        Self {
            config,
            policy: WeightPolicy::default(),
            baseline: MovementBaseline::default(),
            stats: CharacterStats::default(),
            registry: ContainerRegistry::new(),
            live: BTreeMap::new(),
            next_instance: 1,
            aggregate_dirty: Arc::new(AtomicBool::new(false)),
            last_total: 0.0,
            clock: Tick(0),
            carry_listeners: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: WeightPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_baseline(mut self, baseline: MovementBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_stats(mut self, stats: CharacterStats) -> Self {
        self.stats = stats;
        self
    }

    // === Accessors ===

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn stats(&self) -> CharacterStats {
        self.stats
    }

    pub fn set_stats(&mut self, stats: CharacterStats) {
        self.stats = stats;
        self.aggregate_dirty.store(true, Ordering::Relaxed);
    }

    pub fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }

    pub fn instance(&self, key: &ContainerKey) -> Option<&ContainerInstance> {
        self.live.get(key)
    }

    pub fn live_keys(&self) -> impl Iterator<Item = &ContainerKey> {
        self.live.keys()
    }

    // === Attach / detach ===

    /// Brings a container item online as a live instance.
    ///
    /// If the key already has a live instance, its persisted contents are
    /// reloaded and the existing id is returned; a second attach never spawns
    /// a duplicate. A fresh instance picks up any saved record for its key,
    /// otherwise its empty state seeds one.
    pub fn attach_container(&mut self, info: ItemDescriptor) -> Result<InstanceId, ContainerError> {
        let key = ContainerKey::for_item(&info.id);

        if let Some(existing) = self.live.get_mut(&key) {
            if let Some(saved) = self.registry.get(&key).cloned() {
                existing.load_state(saved);
            }
            return Ok(existing.id());
        }

        let id = InstanceId(self.next_instance);
        self.next_instance += 1;

        let mut instance = ContainerInstance::new(id, info, self.config)?;
        instance.tick(self.clock);
        instance.register_listener(Arc::new(AggregateDirty(self.aggregate_dirty.clone())));

        match self.registry.get(&key).cloned() {
            Some(saved) => instance.load_state(saved),
            None => self.registry.upsert(instance.state().clone()),
        }

        self.live.insert(key, instance);
        self.aggregate_dirty.store(true, Ordering::Relaxed);
        Ok(id)
    }

    /// Takes a container offline, persisting its contents first.
    ///
    /// The caller must present the instance id it was handed at attach time;
    /// a stale id (the key has since been detached and re-attached) is
    /// refused so it cannot evict the newer instance. The registry record
    /// survives detachment.
    pub fn detach_container(&mut self, key: &ContainerKey, id: InstanceId) -> bool {
        let Some(instance) = self.live.get_mut(key) else {
            return false;
        };
        if instance.id() != id {
            return false;
        }

        instance.force_close(&mut self.registry);
        self.live.remove(key);
        self.aggregate_dirty.store(true, Ordering::Relaxed);
        true
    }

    // === Lifecycle routing ===

    pub fn open_container(&mut self, key: &ContainerKey) -> Result<(), ContainerError> {
        let Some(instance) = self.live.get_mut(key) else {
            return Err(ContainerError::NotLive { key: key.clone() });
        };
        if instance.open(&mut self.registry) {
            Ok(())
        } else {
            Err(ContainerError::InvalidItemId)
        }
    }

    pub fn close_container(&mut self, key: &ContainerKey) -> Result<(), ContainerError> {
        let Some(instance) = self.live.get_mut(key) else {
            return Err(ContainerError::NotLive { key: key.clone() });
        };
        instance.close(&mut self.registry);
        Ok(())
    }

    pub fn register_container_listener(
        &mut self,
        key: &ContainerKey,
        listener: Arc<dyn ContainerListener>,
    ) -> Result<(), ContainerError> {
        self.live_mut(key)?.register_listener(listener);
        Ok(())
    }

    pub fn register_carry_listener(&mut self, listener: Arc<dyn CarryWeightListener>) {
        self.carry_listeners.push(listener);
    }

    // === Slot operations ===

    /// Routes a slot command to the live container addressed by `key`.
    pub fn apply(
        &mut self,
        key: &ContainerKey,
        command: SlotCommand,
    ) -> Result<(), InventoryError> {
        let Some(instance) = self.live.get_mut(key) else {
            return Err(ContainerError::NotLive { key: key.clone() }.into());
        };
        command.apply(instance, &mut self.registry)?;
        Ok(())
    }

    /// Stows a loose item into the first live container that can take it,
    /// preferring partial stacks within each container. Returns where the
    /// item landed.
    ///
    /// Container items are never stowed; attach them with
    /// [`attach_container`](Self::attach_container) instead.
    pub fn pickup(
        &mut self,
        item: ItemDescriptor,
        quantity: u32,
    ) -> Result<(ContainerKey, usize), InventoryError> {
        if item.is_container() {
            return Err(CommandError::NestingForbidden.into());
        }

        let mut destination = None;
        for (key, instance) in &self.live {
            if let Some(slot) = instance.find_or_create_slot_index(&item) {
                destination = Some((key.clone(), slot));
                break;
            }
        }
        let Some((key, slot)) = destination else {
            return Err(CommandError::NoSpace { item: item.id }.into());
        };

        let Some(instance) = self.live.get_mut(&key) else {
            return Err(ContainerError::NotLive { key }.into());
        };
        SlotCommand::Add {
            item,
            quantity,
            target_slot: Some(slot),
        }
        .apply(instance, &mut self.registry)?;
        Ok((key, slot))
    }

    // === Persistence ===

    /// Replaces the registry wholesale (a restore from storage) and pushes
    /// the saved records back into any matching live instances.
    pub fn load_registry(&mut self, registry: ContainerRegistry) {
        self.registry = registry;
        self.restore_all();
    }

    /// Brings every persisted top-level record online as a live instance,
    /// reloading the ones already attached, then refreshes the carried-weight
    /// aggregate. Run once after the owning character becomes active.
    pub fn restore_all(&mut self) {
        for key in self.registry.keys_at_depth(0) {
            let Some(info) = self.registry.get(&key).map(|saved| saved.info().clone()) else {
                continue;
            };
            // Registry records only ever hold container descriptors
            let _ = self.attach_container(info);
        }
        self.refresh_total_weight();
    }

    // === Weight aggregation and movement ===

    /// Carried weight as of the last aggregate pass.
    pub fn total_carry_weight(&self) -> f32 {
        self.last_total
    }

    pub fn carry_capacity(&self) -> f32 {
        self.stats.carry_capacity()
    }

    pub fn is_over_capacity(&self) -> bool {
        self.last_total > self.stats.carry_capacity()
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.policy
            .speed_multiplier(self.last_total, self.stats.carry_capacity())
    }

    pub fn movement_profile(&self) -> MovementProfile {
        self.policy
            .movement_profile(&self.baseline, self.speed_multiplier())
    }

    /// Advances the simulation clock: pumps per-instance debounce timers,
    /// drops instances a forced close marked for removal, and runs at most
    /// one aggregate weight pass if anything changed.
    pub fn tick(&mut self, now: Tick) {
        self.clock = now;
        for instance in self.live.values_mut() {
            instance.tick(now);
        }
        self.live.retain(|_, instance| !instance.is_pending_removal());

        if self.aggregate_dirty.swap(false, Ordering::Relaxed) {
            self.refresh_total_weight();
        }
    }

    fn live_mut(&mut self, key: &ContainerKey) -> Result<&mut ContainerInstance, ContainerError> {
        self.live
            .get_mut(key)
            .ok_or_else(|| ContainerError::NotLive { key: key.clone() })
    }

    /// Sums every persisted record (bag plus contents each), not just live
    /// instances, and notifies carry listeners when the figure moved by more
    /// than the epsilon. Carried weight reflects all possessions, open or
    /// not.
    fn refresh_total_weight(&mut self) {
        let total = self.registry.total_weight();

        if (total - self.last_total).abs() > self.config.weight_epsilon {
            self.last_total = total;
            for listener in &self.carry_listeners {
                listener.total_weight_changed(total);
            }
        }
    }
}

impl Default for InventoryCoordinator {
    fn default() -> Self {
        Self::new(InventoryConfig::default())
    }
}
