//! Async session runtime for the inventory system.
//!
//! The runtime owns a background worker holding the authoritative
//! [`inventory_core::InventoryCoordinator`], pumps its deterministic clock
//! from a wall-clock interval, and exposes a channel-based API: commands in
//! through [`SessionHandle`], [`InventoryEvent`] notifications out through a
//! broadcast channel.

pub mod error;
pub mod events;
pub mod providers;
pub mod session;
pub mod worker;

pub use error::{Result, SessionError};
pub use events::InventoryEvent;
pub use providers::{CharacterStatsProvider, MovementSink, NullMovementSink, StaticStatsProvider};
pub use session::{InventorySession, SessionBuilder, SessionConfig, SessionHandle};
pub use worker::{Command, SessionWorker, WeightReport};
