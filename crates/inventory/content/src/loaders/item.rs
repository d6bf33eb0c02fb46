//! Item catalog loader.

use std::collections::BTreeSet;
use std::path::Path;

use inventory_core::{ItemDescriptor, ItemId};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files, indexed by id after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<ItemDescriptor>,
}

impl ItemCatalog {
    pub fn get(&self, id: &ItemId) -> Option<&ItemDescriptor> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// The container-type entries of the catalog.
    pub fn containers(&self) -> impl Iterator<Item = &ItemDescriptor> {
        self.items.iter().filter(|item| item.is_container())
    }

    /// Checks the catalog invariants: ids valid and unique, weights
    /// non-negative, stack sizes at least one, and containers carrying a
    /// positive slot count.
    pub fn validate(&self) -> LoadResult<()> {
        let mut seen: BTreeSet<&ItemId> = BTreeSet::new();
        for item in &self.items {
            if !item.id.is_valid() {
                anyhow::bail!("Catalog entry {:?} has an empty id", item.display_name);
            }
            if !seen.insert(&item.id) {
                anyhow::bail!("Duplicate catalog id {}", item.id);
            }
            if item.weight < 0.0 {
                anyhow::bail!("Item {} has negative weight", item.id);
            }
            if item.max_stack_size == 0 {
                anyhow::bail!("Item {} has a zero stack size", item.id);
            }
            if item.is_container() && item.slot_count == 0 {
                anyhow::bail!("Container {} has no slots", item.id);
            }
            if !item.is_container() && item.slot_count != 0 {
                anyhow::bail!("Non-container {} declares slots", item.id);
            }
        }
        Ok(())
    }
}

/// Loader for item catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load and validate an item catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<ItemCatalog> {
        let content = read_file(path)?;
        let catalog: ItemCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;
        catalog.validate()?;

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use inventory_core::ItemKind;

    use super::*;

    const CATALOG_RON: &str = r#"(
    items: [
        (
            id: ("potion"),
            display_name: "Potion",
            kind: Consumable,
            weight: 0.5,
            max_stack_size: 20,
            slot_count: 0,
            weight_reduction_percent: 0.0,
        ),
        (
            id: ("bag1"),
            display_name: "Leather Bag",
            kind: Container,
            weight: 2.0,
            max_stack_size: 1,
            slot_count: 8,
            weight_reduction_percent: 25.0,
        ),
    ],
)"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn loads_and_indexes_a_catalog() {
        let file = write_temp(CATALOG_RON);
        let catalog = CatalogLoader::load(file.path()).expect("catalog loads");

        assert_eq!(catalog.items.len(), 2);
        let bag = catalog.get(&ItemId::new("bag1")).expect("bag present");
        assert_eq!(bag.kind, ItemKind::Container);
        assert_eq!(bag.slot_count, 8);
        assert_eq!(catalog.containers().count(), 1);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut catalog = CatalogLoader::load(write_temp(CATALOG_RON).path()).unwrap();
        catalog.items.push(catalog.items[0].clone());
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn rejects_containers_without_slots() {
        let mut catalog = CatalogLoader::load(write_temp(CATALOG_RON).path()).unwrap();
        catalog.items[1].slot_count = 0;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(CatalogLoader::load(Path::new("/nonexistent/catalog.ron")).is_err());
    }
}
