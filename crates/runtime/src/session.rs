//! High-level session orchestration.
//!
//! [`InventorySession`] owns the background worker and wires up the command
//! and event channels; [`SessionHandle`] is the cloneable façade clients use
//! to issue requests and stream events.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use inventory_content::{ItemCatalog, TuningConfig};
use inventory_core::{
    CharacterStats, ContainerKey, ContainerRegistry, InstanceId, InventoryCoordinator,
    ItemDescriptor, ItemId, SlotCommand,
};

use crate::error::{Result, SessionError};
use crate::events::{EventBridge, InventoryEvent};
use crate::providers::{CharacterStatsProvider, MovementSink};
use crate::worker::{Command, SessionWorker, WeightReport};

/// Session configuration shared across the orchestrator and the worker.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Granularity of the deterministic clock, in milliseconds. Debounce
    /// deadlines resolve at this granularity.
    pub tick_interval_ms: u64,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            command_buffer_size: 32,
            event_buffer_size: 100,
        }
    }
}

/// Client-facing handle to interact with the session.
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<InventoryEvent>,
}

impl SessionHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<InventoryEvent>,
    ) -> Self {
        Self {
            command_tx,
            event_tx,
        }
    }

    /// Subscribe to inventory events.
    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.event_tx.subscribe()
    }

    /// Bring a container item online; returns the instance id needed for
    /// identity-checked detachment.
    pub async fn attach(&self, info: ItemDescriptor) -> Result<InstanceId> {
        self.request(|reply| Command::Attach { info, reply })
            .await?
    }

    /// Attach a container by catalog id.
    pub async fn attach_by_id(&self, id: ItemId) -> Result<InstanceId> {
        self.request(|reply| Command::AttachById { id, reply })
            .await?
    }

    /// Take a container offline. False when the key is unknown or `id` is
    /// stale; the persisted record survives either way.
    pub async fn detach(&self, key: ContainerKey, id: InstanceId) -> Result<bool> {
        self.request(|reply| Command::Detach { key, id, reply })
            .await
    }

    pub async fn open(&self, key: ContainerKey) -> Result<()> {
        self.request(|reply| Command::Open { key, reply }).await?
    }

    pub async fn close(&self, key: ContainerKey) -> Result<()> {
        self.request(|reply| Command::Close { key, reply }).await?
    }

    /// Execute a slot command against one container.
    pub async fn apply(&self, key: ContainerKey, command: SlotCommand) -> Result<()> {
        self.request(|reply| Command::Apply {
            key,
            command,
            reply,
        })
        .await?
    }

    /// Stow a loose item into the first container with room; returns where
    /// it landed.
    pub async fn pickup(
        &self,
        item: ItemDescriptor,
        quantity: u32,
    ) -> Result<(ContainerKey, usize)> {
        self.request(|reply| Command::Pickup {
            item,
            quantity,
            reply,
        })
        .await?
    }

    /// Read-only snapshot of the persisted registry.
    pub async fn registry_snapshot(&self) -> Result<ContainerRegistry> {
        self.request(|reply| Command::QueryRegistry { reply }).await
    }

    pub async fn weight_report(&self) -> Result<WeightReport> {
        self.request(|reply| Command::QueryWeight { reply }).await
    }

    /// Update character stats; carry capacity follows on the next tick.
    pub async fn set_stats(&self, stats: CharacterStats) -> Result<()> {
        self.command_tx
            .send(Command::SetStats { stats })
            .await
            .map_err(|_| SessionError::CommandChannelClosed)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| SessionError::CommandChannelClosed)?;

        reply_rx.await.map_err(SessionError::ReplyChannelClosed)
    }
}

/// Running inventory session.
///
/// Owns the worker task; [`handle`](Self::handle) hands out cloneable
/// façades. Dropping the last handle (including this session's own) stops
/// the worker, which closes every live container on the way out.
pub struct InventorySession {
    handle: SessionHandle,
    worker: JoinHandle<()>,
}

impl InventorySession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.handle.subscribe()
    }

    /// Shutdown gracefully: stop accepting commands from this session's own
    /// handle and wait for the worker to flush and exit.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker.await.map_err(SessionError::WorkerJoin)
    }
}

/// Builder for [`InventorySession`] with flexible configuration.
pub struct SessionBuilder {
    config: SessionConfig,
    tuning: TuningConfig,
    catalog: Option<ItemCatalog>,
    stats_provider: Option<Arc<dyn CharacterStatsProvider>>,
    movement_sink: Option<Arc<dyn MovementSink>>,
}

impl SessionBuilder {
    fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            tuning: TuningConfig::default(),
            catalog: None,
            stats_provider: None,
            movement_sink: None,
        }
    }

    /// Override session configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Inventory and movement tuning, typically loaded from a TOML file.
    pub fn tuning(mut self, tuning: TuningConfig) -> Self {
        self.tuning = tuning;
        self
    }

    /// Item catalog backing [`SessionHandle::attach_by_id`].
    pub fn catalog(mut self, catalog: ItemCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Source of character stats; overrides the tuning file's stats section.
    pub fn stats_provider(mut self, provider: Arc<dyn CharacterStatsProvider>) -> Self {
        self.stats_provider = Some(provider);
        self
    }

    /// Receiver for movement-penalty updates.
    pub fn movement_sink(mut self, sink: Arc<dyn MovementSink>) -> Self {
        self.movement_sink = Some(sink);
        self
    }

    /// Spawn the worker and return the running session.
    pub async fn start(self) -> Result<InventorySession> {
        let stats = match &self.stats_provider {
            Some(provider) => provider.character_stats().await,
            None => self.tuning.stats,
        };

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let (event_tx, _) = broadcast::channel(self.config.event_buffer_size);

        let mut coordinator = InventoryCoordinator::new(self.tuning.inventory)
            .with_policy(self.tuning.weight_policy)
            .with_baseline(self.tuning.movement)
            .with_stats(stats);
        coordinator.register_carry_listener(Arc::new(EventBridge::new(event_tx.clone())));

        let worker = SessionWorker::new(
            coordinator,
            self.catalog,
            command_rx,
            event_tx.clone(),
            self.movement_sink,
            self.config.tick_interval_ms,
        );
        let worker = tokio::spawn(worker.run());

        info!(capacity = stats.carry_capacity(), "inventory session started");
        Ok(InventorySession {
            handle: SessionHandle::new(command_tx, event_tx),
            worker,
        })
    }
}
