//! Inventory tuning loader.

use std::path::Path;

use inventory_core::{CharacterStats, InventoryConfig, MovementBaseline, WeightPolicy};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Tuning structure for TOML files. Every section is optional and falls
/// back to the inventory-core defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TuningConfig {
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub weight_policy: WeightPolicy,
    #[serde(default)]
    pub movement: MovementBaseline,
    #[serde(default)]
    pub stats: CharacterStats,
}

/// Loader for inventory tuning from TOML files.
pub struct TuningLoader;

impl TuningLoader {
    /// Load tuning data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<TuningConfig> {
        let content = read_file(path)?;
        let tuning: TuningConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tuning TOML: {}", e))?;

        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_partial_tuning_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
[inventory]
weight_debounce_ms = 250
save_cooldown_ms = 100
weight_epsilon = 1e-4
reopen_policy = "Ignore"

[weight_policy]
floor = 0.25
slope = 1.0
"#
        )
        .expect("write");

        let tuning = TuningLoader::load(file.path()).expect("tuning loads");
        assert_eq!(tuning.inventory.weight_debounce_ms, 250);
        assert_eq!(tuning.weight_policy.floor, 0.25);
        // Omitted sections fall back to defaults
        assert_eq!(tuning.movement.max_walk_speed, 600.0);
        assert_eq!(tuning.stats.carry_capacity(), 100.0);
    }

    #[test]
    fn rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "[inventory\nbroken").expect("write");
        assert!(TuningLoader::load(file.path()).is_err());
    }
}
