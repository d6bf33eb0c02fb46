/// Inventory configuration constants and tunable parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryConfig {
    /// Quiet period before a debounced weight recompute fires, in milliseconds.
    pub weight_debounce_ms: u64,
    /// Cooldown after a registry save during which further saves are skipped,
    /// in milliseconds.
    pub save_cooldown_ms: u64,
    /// Two weights closer than this are treated as equal; suppresses
    /// weight-changed notifications for float noise.
    pub weight_epsilon: f32,
    /// What `open()` does when the container is already open.
    pub reopen_policy: ReopenPolicy,
}

impl InventoryConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_WEIGHT_DEBOUNCE_MS: u64 = 100;
    pub const DEFAULT_SAVE_COOLDOWN_MS: u64 = 100;
    pub const DEFAULT_WEIGHT_EPSILON: f32 = 1.0e-4;

    pub fn new() -> Self {
        Self {
            weight_debounce_ms: Self::DEFAULT_WEIGHT_DEBOUNCE_MS,
            save_cooldown_ms: Self::DEFAULT_SAVE_COOLDOWN_MS,
            weight_epsilon: Self::DEFAULT_WEIGHT_EPSILON,
            reopen_policy: ReopenPolicy::Ignore,
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Behavior of `open()` on an instance that is already open.
///
/// Both variants exist in the wild; `Ignore` keeps the open state and its
/// listeners untouched, `ForceReopen` closes first (flushing state) and then
/// reopens, re-notifying every slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReopenPolicy {
    /// Opening an open container is a successful no-op.
    #[default]
    Ignore,
    /// Opening an open container closes it (persisting state) and reopens.
    ForceReopen,
}
