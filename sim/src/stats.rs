//! Per-kind base stats and level scaling.
//!
//! Spawn and merge both go through [`calculate_monster_stats`], so the same
//! `(kind, level)` always yields the same monster.

use crate::components::MonsterType;
use serde::{Deserialize, Serialize};

/// Level-scaled monster stats, floored to whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterStats {
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub radius: u32,
}

/// Level 1 stats for each kind.
pub fn base_stats(kind: MonsterType) -> MonsterStats {
    match kind {
        MonsterType::Fire => MonsterStats {
            health: 80,
            attack: 15,
            defense: 5,
            speed: 100,
            radius: 20,
        },
        MonsterType::Water => MonsterStats {
            health: 100,
            attack: 10,
            defense: 10,
            speed: 80,
            radius: 22,
        },
        MonsterType::Earth => MonsterStats {
            health: 150,
            attack: 8,
            defense: 15,
            speed: 60,
            radius: 25,
        },
        MonsterType::Air => MonsterStats {
            health: 60,
            attack: 12,
            defense: 3,
            speed: 150,
            radius: 18,
        },
    }
}

// Growth per level above 1.
const HEALTH_GROWTH: f64 = 0.5;
const ATTACK_GROWTH: f64 = 0.3;
const DEFENSE_GROWTH: f64 = 0.3;
const SPEED_GROWTH: f64 = 0.1;
const RADIUS_GROWTH: f64 = 0.2;

/// Highest level the stat curves are defined for.
pub const MAX_LEVEL_LIMIT: u32 = 100;

/// Stats for `kind` at `level`. Level 0 is treated as level 1, and levels
/// above [`MAX_LEVEL_LIMIT`] as the limit.
pub fn calculate_monster_stats(kind: MonsterType, level: u32) -> MonsterStats {
    let base = base_stats(kind);
    let steps = f64::from(level.clamp(1, MAX_LEVEL_LIMIT) - 1);
    let scale = |value: u32, growth: f64| (f64::from(value) * (1.0 + steps * growth)).floor() as u32;

    MonsterStats {
        health: scale(base.health, HEALTH_GROWTH),
        attack: scale(base.attack, ATTACK_GROWTH),
        defense: scale(base.defense, DEFENSE_GROWTH),
        speed: scale(base.speed, SPEED_GROWTH),
        radius: scale(base.radius, RADIUS_GROWTH),
    }
}
