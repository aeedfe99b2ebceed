//! Configuration consumed when a world is constructed.

use crate::components::MonsterType;
use crate::error::{SimError, SimResult};
use crate::stats::{calculate_monster_stats, MAX_LEVEL_LIMIT};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of monster kinds the stat table knows about.
pub const MAX_MONSTER_TYPES: u32 = 4;

/// Arena and spawn configuration.
///
/// Immutable for the life of a `SimWorld`; systems read it as a resource.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Arena width in world units. The arena spans `0..arena_width`.
    pub arena_width: f32,
    /// Arena height in world units.
    pub arena_height: f32,
    /// Mean seconds between enemy spawns (jittered by ±20%).
    pub base_spawn_interval: f32,
    /// How many monster kinds are in play (1..=4).
    pub monster_type_count: u32,
    /// Level cap for spawns and merges.
    pub max_level: u32,
    /// Player monsters created with the world.
    pub initial_player_monsters: u32,
    /// Fixed RNG seed. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_width: 800.0,
            arena_height: 600.0,
            base_spawn_interval: 3.0,
            monster_type_count: MAX_MONSTER_TYPES,
            max_level: 5,
            initial_player_monsters: 2,
            rng_seed: None,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.arena_width.is_finite() && self.arena_width > 0.0) {
            return Err(invalid("arena_width", format!("must be positive, got {}", self.arena_width)));
        }
        if !(self.arena_height.is_finite() && self.arena_height > 0.0) {
            return Err(invalid("arena_height", format!("must be positive, got {}", self.arena_height)));
        }
        if !(self.base_spawn_interval.is_finite() && self.base_spawn_interval > 0.0) {
            return Err(invalid(
                "base_spawn_interval",
                format!("must be positive, got {}", self.base_spawn_interval),
            ));
        }
        if self.monster_type_count == 0 || self.monster_type_count > MAX_MONSTER_TYPES {
            return Err(invalid(
                "monster_type_count",
                format!("must be in 1..={}, got {}", MAX_MONSTER_TYPES, self.monster_type_count),
            ));
        }
        if self.max_level == 0 || self.max_level > MAX_LEVEL_LIMIT {
            return Err(invalid(
                "max_level",
                format!("must be in 1..={}, got {}", MAX_LEVEL_LIMIT, self.max_level),
            ));
        }
        let widest = self.largest_radius();
        let extent = self.arena_width.min(self.arena_height);
        if widest * 2.0 > extent {
            return Err(invalid(
                "max_level",
                format!(
                    "level {} monsters are {} units wide, arena is only {}",
                    self.max_level,
                    widest * 2.0,
                    extent
                ),
            ));
        }
        Ok(())
    }

    /// Collider radius of the biggest monster this config can produce.
    pub fn largest_radius(&self) -> f32 {
        MonsterType::ALL
            .iter()
            .take(self.monster_type_count as usize)
            .map(|&kind| calculate_monster_stats(kind, self.max_level).radius)
            .max()
            .unwrap_or(0) as f32
    }
}

fn invalid(field: &'static str, reason: String) -> SimError {
    SimError::InvalidConfig { field, reason }
}
