//! Data-driven inventory content and loaders.
//!
//! This crate houses the static data the inventory system consumes and
//! provides loaders for RON/TOML data files:
//! - Item catalogs, containers included (data-driven via RON)
//! - Inventory and movement tuning (data-driven via TOML)
//!
//! Content feeds the coordinator at startup and never appears in persisted
//! state. All loaders use inventory-core types directly with serde for
//! RON/TOML deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CatalogLoader, ItemCatalog, TuningConfig, TuningLoader};
