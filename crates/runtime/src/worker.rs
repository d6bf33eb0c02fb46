//! Session worker that owns the authoritative [`InventoryCoordinator`].
//!
//! Receives commands from [`SessionHandle`](crate::session::SessionHandle),
//! routes them into inventory-core, and pumps the deterministic tick clock
//! from a wall-clock interval so debounced saves and weight recomputes fire.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use inventory_content::ItemCatalog;
use inventory_core::{
    CharacterStats, ContainerKey, ContainerListener, ContainerRegistry, InstanceId,
    InventoryCoordinator, InventoryError, ItemDescriptor, ItemId, SlotCommand, Tick,
};

use crate::error::{Result, SessionError};
use crate::events::{EventBridge, InventoryEvent};
use crate::providers::MovementSink;

/// Commands that can be sent to the session worker.
pub enum Command {
    /// Bring a container item online. Returns the instance id needed for
    /// identity-checked detachment.
    Attach {
        info: ItemDescriptor,
        reply: oneshot::Sender<Result<InstanceId>>,
    },
    /// Attach a container looked up from the content catalog.
    AttachById {
        id: ItemId,
        reply: oneshot::Sender<Result<InstanceId>>,
    },
    /// Take a container offline, persisting its contents. False when the key
    /// is unknown or the id is stale.
    Detach {
        key: ContainerKey,
        id: InstanceId,
        reply: oneshot::Sender<bool>,
    },
    Open {
        key: ContainerKey,
        reply: oneshot::Sender<Result<()>>,
    },
    Close {
        key: ContainerKey,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Execute a slot command against one container.
    Apply {
        key: ContainerKey,
        command: SlotCommand,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Stow a loose item into the first container with room.
    Pickup {
        item: ItemDescriptor,
        quantity: u32,
        reply: oneshot::Sender<Result<(ContainerKey, usize)>>,
    },
    /// Snapshot of the persisted registry (read-only).
    QueryRegistry {
        reply: oneshot::Sender<ContainerRegistry>,
    },
    QueryWeight {
        reply: oneshot::Sender<WeightReport>,
    },
    /// Update character stats; carry capacity follows on the next tick.
    SetStats { stats: CharacterStats },
}

/// Carried-weight summary as of the last aggregate pass.
#[derive(Clone, Copy, Debug)]
pub struct WeightReport {
    pub total: f32,
    pub capacity: f32,
    pub multiplier: f32,
}

/// Background task that processes inventory commands and drives the clock.
pub struct SessionWorker {
    coordinator: InventoryCoordinator,
    catalog: Option<ItemCatalog>,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<InventoryEvent>,
    movement_sink: Option<Arc<dyn MovementSink>>,
    bridged: BTreeSet<ContainerKey>,
    tick_interval_ms: u64,
    clock_ms: u64,
    last_multiplier: f32,
}

impl SessionWorker {
    pub fn new(
        coordinator: InventoryCoordinator,
        catalog: Option<ItemCatalog>,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<InventoryEvent>,
        movement_sink: Option<Arc<dyn MovementSink>>,
        tick_interval_ms: u64,
    ) -> Self {
        Self {
            coordinator,
            catalog,
            command_rx,
            event_tx,
            movement_sink,
            bridged: BTreeSet::new(),
            tick_interval_ms,
            clock_ms: 0,
            last_multiplier: 1.0,
        }
    }

    /// Main worker loop. Exits when every command sender is gone, closing
    /// all live containers so no debounced write is lost.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(Duration::from_millis(self.tick_interval_ms));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                maybe_cmd = self.command_rx.recv() => match maybe_cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = ticker.tick() => self.advance_clock().await,
            }
        }

        self.close_all();
        debug!("session worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Attach { info, reply } => {
                let _ = reply.send(self.attach(info));
            }
            Command::AttachById { id, reply } => {
                let _ = reply.send(self.attach_by_id(id));
            }
            Command::Detach { key, id, reply } => {
                let removed = self.coordinator.detach_container(&key, id);
                if removed {
                    self.bridged.remove(&key);
                }
                let _ = reply.send(removed);
            }
            Command::Open { key, reply } => {
                let result = self
                    .coordinator
                    .open_container(&key)
                    .map_err(InventoryError::from)
                    .map_err(SessionError::from);
                self.report_failure(&key, &result);
                let _ = reply.send(result);
            }
            Command::Close { key, reply } => {
                let result = self
                    .coordinator
                    .close_container(&key)
                    .map_err(InventoryError::from)
                    .map_err(SessionError::from);
                let _ = reply.send(result);
            }
            Command::Apply { key, command, reply } => {
                let result = self
                    .coordinator
                    .apply(&key, command)
                    .map_err(SessionError::from);
                self.report_failure(&key, &result);
                let _ = reply.send(result);
            }
            Command::Pickup {
                item,
                quantity,
                reply,
            } => {
                let result = self
                    .coordinator
                    .pickup(item, quantity)
                    .map_err(SessionError::from);
                if let Err(error) = &result {
                    debug!(%error, "pickup rejected");
                }
                let _ = reply.send(result);
            }
            Command::QueryRegistry { reply } => {
                let _ = reply.send(self.coordinator.registry().clone());
            }
            Command::QueryWeight { reply } => {
                let _ = reply.send(WeightReport {
                    total: self.coordinator.total_carry_weight(),
                    capacity: self.coordinator.carry_capacity(),
                    multiplier: self.coordinator.speed_multiplier(),
                });
            }
            Command::SetStats { stats } => {
                self.coordinator.set_stats(stats);
            }
        }
    }

    fn attach(&mut self, info: ItemDescriptor) -> Result<InstanceId> {
        let key = ContainerKey::for_item(&info.id);
        let id = self
            .coordinator
            .attach_container(info)
            .map_err(InventoryError::from)?;

        // One event bridge per live container; re-attach reuses the
        // existing one.
        if self.bridged.insert(key.clone()) {
            let bridge: Arc<dyn ContainerListener> =
                Arc::new(EventBridge::new(self.event_tx.clone()));
            let _ = self.coordinator.register_container_listener(&key, bridge);
        }
        debug!(%key, ?id, "container attached");
        Ok(id)
    }

    fn attach_by_id(&mut self, id: ItemId) -> Result<InstanceId> {
        let info = self
            .catalog
            .as_ref()
            .and_then(|catalog| catalog.get(&id))
            .cloned()
            .ok_or(SessionError::UnknownItem { id })?;
        self.attach(info)
    }

    /// Advances the deterministic clock by one interval and propagates any
    /// resulting movement-penalty change.
    async fn advance_clock(&mut self) {
        self.clock_ms += self.tick_interval_ms;
        self.coordinator.tick(Tick(self.clock_ms));

        let multiplier = self.coordinator.speed_multiplier();
        if (multiplier - self.last_multiplier).abs() > f32::EPSILON {
            self.last_multiplier = multiplier;
            let profile = self.coordinator.movement_profile();
            debug!(multiplier, "movement penalty updated");
            let _ = self.event_tx.send(InventoryEvent::MovementChanged {
                multiplier,
                profile,
            });
            if let Some(sink) = &self.movement_sink {
                sink.apply_movement(multiplier, profile).await;
            }
        }
    }

    fn report_failure<T>(&self, key: &ContainerKey, result: &Result<T>) {
        if let Err(error) = result {
            warn!(%key, %error, "inventory request rejected");
            let _ = self.event_tx.send(InventoryEvent::InteractionFailed {
                key: key.clone(),
                reason: error.to_string(),
            });
        }
    }

    fn close_all(&mut self) {
        let keys: Vec<ContainerKey> = self.coordinator.live_keys().cloned().collect();
        for key in keys {
            let _ = self.coordinator.close_container(&key);
        }
    }
}
