//! Content loaders for reading inventory data from files.
//!
//! Loaders convert RON/TOML files into inventory-core types and validate
//! them before handing them over; a catalog that loads is safe to index.

pub mod item;
pub mod tuning;

pub use item::{CatalogLoader, ItemCatalog};
pub use tuning::{TuningConfig, TuningLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
