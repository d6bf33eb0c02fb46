//! Asynchronous seams between the session and its host.
//!
//! Hosts plug in a [`CharacterStatsProvider`] so carry capacity tracks the
//! character sheet, and a [`MovementSink`] so weight penalties reach the
//! movement system, without the session knowing either subsystem.
use async_trait::async_trait;

use inventory_core::{CharacterStats, MovementProfile};

/// Source of the character attributes that feed carry capacity.
#[async_trait]
pub trait CharacterStatsProvider: Send + Sync {
    async fn character_stats(&self) -> CharacterStats;
}

/// Fixed stats; useful for tests and offline tools.
pub struct StaticStatsProvider(pub CharacterStats);

#[async_trait]
impl CharacterStatsProvider for StaticStatsProvider {
    async fn character_stats(&self) -> CharacterStats {
        self.0
    }
}

/// Receives movement-parameter updates when the weight penalty changes.
#[async_trait]
pub trait MovementSink: Send + Sync {
    async fn apply_movement(&self, multiplier: f32, profile: MovementProfile);
}

/// Discards movement updates.
pub struct NullMovementSink;

#[async_trait]
impl MovementSink for NullMovementSink {
    async fn apply_movement(&self, _multiplier: f32, _profile: MovementProfile) {}
}
