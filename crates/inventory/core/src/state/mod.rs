//! Persisted inventory state types.
//!
//! [`SlotState`] is one cell, [`ContainerState`] a container's identity plus
//! its slot array, and [`ContainerRegistry`] the character-owned record of
//! every container ever seen. Live instances mutate these through
//! [`crate::ContainerInstance`]; nothing else writes them.

mod container;
mod registry;
mod slot;

pub use container::ContainerState;
pub use registry::ContainerRegistry;
pub use slot::SlotState;
