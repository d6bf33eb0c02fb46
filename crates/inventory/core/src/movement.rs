//! Weight/movement policy.
//!
//! Pure functions mapping carried weight against carry capacity to a
//! movement-speed multiplier, consumed by the movement subsystem.
//!
//! Formulas:
//! - ratio = current_weight / capacity
//! - ratio <= 1: multiplier = 1 (no penalty)
//! - ratio >  1: multiplier = max(floor, 1 - (ratio - 1) × slope)

/// Tunable overweight penalty curve.
///
/// Observed tunings vary (0.2/0.5, 0.25/1.0); the constants are exposed
/// rather than baked in so the host can pin the variant it wants.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightPolicy {
    /// Lower bound on the multiplier; overweight never slows below this.
    pub floor: f32,
    /// Penalty per unit of overweight ratio beyond 1.
    pub slope: f32,
}

impl WeightPolicy {
    pub const DEFAULT_FLOOR: f32 = 0.2;
    pub const DEFAULT_SLOPE: f32 = 0.5;

    pub fn new(floor: f32, slope: f32) -> Self {
        Self { floor, slope }
    }

    /// Movement-speed multiplier for the given load.
    ///
    /// # Examples
    /// - capacity 100, weight 100 (ratio 1.0): multiplier 1.0
    /// - capacity 100, weight 150 (ratio 1.5), floor 0.2, slope 0.5:
    ///   multiplier = max(0.2, 1 - 0.5 × 0.5) = 0.75
    pub fn speed_multiplier(&self, current_weight: f32, capacity: f32) -> f32 {
        if capacity <= 0.0 {
            return self.floor;
        }
        let ratio = current_weight / capacity;
        if ratio <= 1.0 {
            1.0
        } else {
            (1.0 - (ratio - 1.0) * self.slope).max(self.floor)
        }
    }

    /// Applies the multiplier to a movement baseline.
    ///
    /// Friction and braking scale with the multiplier as well, so an
    /// overweight character accelerates sluggishly instead of just losing
    /// top speed.
    pub fn movement_profile(&self, baseline: &MovementBaseline, multiplier: f32) -> MovementProfile {
        if multiplier >= 1.0 {
            MovementProfile {
                max_walk_speed: baseline.max_walk_speed,
                ground_friction: baseline.ground_friction,
                braking_deceleration: baseline.braking_deceleration,
            }
        } else {
            MovementProfile {
                max_walk_speed: baseline.max_walk_speed * multiplier,
                ground_friction: baseline.ground_friction * multiplier,
                braking_deceleration: baseline.braking_deceleration * multiplier,
            }
        }
    }
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FLOOR, Self::DEFAULT_SLOPE)
    }
}

/// Character attributes feeding the weight policy.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterStats {
    pub strength: f32,
}

impl CharacterStats {
    /// Carry weight granted per point of strength.
    pub const CARRY_WEIGHT_PER_STRENGTH: f32 = 10.0;

    pub fn new(strength: f32) -> Self {
        Self { strength }
    }

    pub fn carry_capacity(&self) -> f32 {
        self.strength * Self::CARRY_WEIGHT_PER_STRENGTH
    }
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self::new(10.0)
    }
}

/// Unpenalized movement parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementBaseline {
    pub max_walk_speed: f32,
    pub ground_friction: f32,
    pub braking_deceleration: f32,
}

impl Default for MovementBaseline {
    fn default() -> Self {
        Self {
            max_walk_speed: 600.0,
            ground_friction: 8.0,
            braking_deceleration: 2000.0,
        }
    }
}

/// Movement parameters after the weight penalty is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementProfile {
    pub max_walk_speed: f32,
    pub ground_friction: f32,
    pub braking_deceleration: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_penalty_at_or_under_capacity() {
        let policy = WeightPolicy::default();
        assert_eq!(policy.speed_multiplier(50.0, 100.0), 1.0);
        // Boundary case: exactly at capacity
        assert_eq!(policy.speed_multiplier(100.0, 100.0), 1.0);
    }

    #[test]
    fn overweight_penalty_matches_curve() {
        let policy = WeightPolicy::new(0.2, 0.5);
        // ratio 1.5 -> max(0.2, 1 - 0.5*0.5) = 0.75
        let multiplier = policy.speed_multiplier(150.0, 100.0);
        assert!((multiplier - 0.75).abs() < 1.0e-6);
    }

    #[test]
    fn penalty_clamps_to_floor() {
        let policy = WeightPolicy::new(0.2, 0.5);
        assert_eq!(policy.speed_multiplier(1000.0, 100.0), 0.2);
        // Degenerate capacity also pins to the floor
        assert_eq!(policy.speed_multiplier(10.0, 0.0), 0.2);
    }

    #[test]
    fn capacity_derives_from_strength() {
        assert_eq!(CharacterStats::default().carry_capacity(), 100.0);
        assert_eq!(CharacterStats::new(15.0).carry_capacity(), 150.0);
    }

    #[test]
    fn profile_scales_friction_and_braking() {
        let policy = WeightPolicy::default();
        let baseline = MovementBaseline::default();

        let slowed = policy.movement_profile(&baseline, 0.75);
        assert!((slowed.max_walk_speed - 450.0).abs() < 1.0e-3);
        assert!((slowed.ground_friction - 6.0).abs() < 1.0e-3);
        assert!((slowed.braking_deceleration - 1500.0).abs() < 1.0e-3);

        let normal = policy.movement_profile(&baseline, 1.0);
        assert_eq!(normal.max_walk_speed, baseline.max_walk_speed);
    }
}
