//! Observer plumbing for container and weight events.
//!
//! Listeners are fire-and-forget with no return value: multiple independent
//! observers (UI, replication, the coordinator's own aggregate bookkeeping)
//! register on the same instance and each sees every event. Default method
//! bodies let an observer implement only the events it cares about.

use std::sync::Arc;

use crate::item::ContainerKey;
use crate::state::SlotState;

/// Observer of a single container instance's lifecycle and contents.
pub trait ContainerListener: Send + Sync {
    /// A slot's contents changed (or are being re-announced on open/load).
    fn slot_updated(&self, _key: &ContainerKey, _index: usize, _slot: &SlotState) {}

    /// The container's own weight (descriptor + contents) changed.
    fn weight_changed(&self, _key: &ContainerKey, _weight: f32) {}

    /// The container transitioned to open.
    fn opened(&self, _key: &ContainerKey) {}

    /// The container transitioned to closed.
    fn closed(&self, _key: &ContainerKey) {}
}

/// Observer of the character-wide carried weight.
pub trait CarryWeightListener: Send + Sync {
    fn total_weight_changed(&self, total: f32);
}

/// Registered listener callbacks for one event source.
#[derive(Clone, Default)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn ContainerListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Arc<dyn ContainerListener>) {
        self.listeners.push(listener);
    }

    pub fn notify_slot_updated(&self, key: &ContainerKey, index: usize, slot: &SlotState) {
        for listener in &self.listeners {
            listener.slot_updated(key, index, slot);
        }
    }

    pub fn notify_weight_changed(&self, key: &ContainerKey, weight: f32) {
        for listener in &self.listeners {
            listener.weight_changed(key, weight);
        }
    }

    pub fn notify_opened(&self, key: &ContainerKey) {
        for listener in &self.listeners {
            listener.opened(key);
        }
    }

    pub fn notify_closed(&self, key: &ContainerKey) {
        for listener in &self.listeners {
            listener.closed(key);
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
