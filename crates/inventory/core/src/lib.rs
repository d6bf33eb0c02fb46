//! Server-authoritative container and carry-weight logic.
//!
//! `inventory-core` defines the canonical inventory rules: persisted
//! container state, the live instances that mutate it, the slot command
//! vocabulary, and the weight policy that maps carried load to movement
//! penalties. Everything here is pure and deterministic; time enters only
//! through the explicit [`Tick`] clock, so the same call sequence always
//! produces the same state. The runtime crate layers transport and wall-clock
//! pumping on top of the types re-exported here.
pub mod command;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod instance;
pub mod item;
pub mod movement;
pub mod state;
pub mod timer;

pub use command::{CommandError, SlotCommand};
pub use config::{InventoryConfig, ReopenPolicy};
pub use coordinator::InventoryCoordinator;
pub use error::{ContainerError, InventoryError};
pub use events::{CarryWeightListener, ContainerListener, ListenerSet};
pub use instance::{ContainerInstance, InstanceFlags, InstanceId};
pub use item::{ContainerKey, ItemDescriptor, ItemId, ItemKind};
pub use movement::{
    CharacterStats, MovementBaseline, MovementProfile, WeightPolicy,
};
pub use state::{ContainerRegistry, ContainerState, SlotState};
pub use timer::{DebounceTimer, Tick};
