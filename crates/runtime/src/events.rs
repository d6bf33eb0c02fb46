//! Inventory events published to session subscribers.
//!
//! The worker owns the coordinator; everything clients observe arrives as an
//! [`InventoryEvent`] on the broadcast channel. [`EventBridge`] adapts the
//! synchronous inventory-core listener callbacks onto that channel.

use tokio::sync::broadcast;

use inventory_core::{
    CarryWeightListener, ContainerKey, ContainerListener, MovementProfile, SlotState,
};

/// Notifications emitted by the session worker.
#[derive(Clone, Debug)]
pub enum InventoryEvent {
    /// A slot's contents changed; carries the slot's new state.
    SlotUpdated {
        key: ContainerKey,
        index: usize,
        slot: SlotState,
    },
    /// One container's weight (bag plus contents) moved past the epsilon.
    ContainerWeightChanged { key: ContainerKey, weight: f32 },
    ContainerOpened { key: ContainerKey },
    ContainerClosed { key: ContainerKey },
    /// The character's aggregate carried weight changed.
    TotalWeightChanged { total: f32 },
    /// The movement penalty changed as a consequence of carried weight.
    MovementChanged {
        multiplier: f32,
        profile: MovementProfile,
    },
    /// A client request was rejected; carries the human-readable reason.
    InteractionFailed { key: ContainerKey, reason: String },
}

/// Forwards listener callbacks to the broadcast channel. Send failures mean
/// no subscriber is listening and are ignored.
pub(crate) struct EventBridge {
    tx: broadcast::Sender<InventoryEvent>,
}

impl EventBridge {
    pub(crate) fn new(tx: broadcast::Sender<InventoryEvent>) -> Self {
        Self { tx }
    }
}

impl ContainerListener for EventBridge {
    fn slot_updated(&self, key: &ContainerKey, index: usize, slot: &SlotState) {
        let _ = self.tx.send(InventoryEvent::SlotUpdated {
            key: key.clone(),
            index,
            slot: slot.clone(),
        });
    }

    fn weight_changed(&self, key: &ContainerKey, weight: f32) {
        let _ = self.tx.send(InventoryEvent::ContainerWeightChanged {
            key: key.clone(),
            weight,
        });
    }

    fn opened(&self, key: &ContainerKey) {
        let _ = self
            .tx
            .send(InventoryEvent::ContainerOpened { key: key.clone() });
    }

    fn closed(&self, key: &ContainerKey) {
        let _ = self
            .tx
            .send(InventoryEvent::ContainerClosed { key: key.clone() });
    }
}

impl CarryWeightListener for EventBridge {
    fn total_weight_changed(&self, total: f32) {
        let _ = self.tx.send(InventoryEvent::TotalWeightChanged { total });
    }
}
