//! ECS Components for the Monster Merge Arena simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.

use crate::error::SimError;
use crate::stats::{calculate_monster_stats, MonsterStats};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Attack range is derived from the collider: `radius * FACTOR + BONUS`.
pub const ATTACK_RANGE_RADIUS_FACTOR: f32 = 2.0;
pub const ATTACK_RANGE_BONUS: f32 = 10.0;
/// Seconds between strikes for every monster.
pub const ATTACK_COOLDOWN: f32 = 1.0;
/// How far an enemy can see a player monster.
pub const AI_DETECTION_RANGE: f32 = 300.0;

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in the arena (origin at the top-left corner).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Position) -> Position {
        Position::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// 2D velocity vector, units per second.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0
    }
}

/// Circle collider. Trigger colliders report overlap but are never pushed apart.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub radius: f32,
    pub is_trigger: bool,
}

impl Collider {
    pub fn solid(radius: f32) -> Self {
        Self {
            radius,
            is_trigger: false,
        }
    }

    pub fn trigger(radius: f32) -> Self {
        Self {
            radius,
            is_trigger: true,
        }
    }
}

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Hit points. `max` is fixed once the entity exists.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Melee attack. The owner may strike only while `timer <= 0`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub damage: f32,
    pub range: f32,
    pub cooldown: f32,
    pub timer: f32,
}

impl Attack {
    pub fn new(damage: f32, range: f32, cooldown: f32) -> Self {
        Self {
            damage,
            range,
            cooldown,
            timer: 0.0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.timer <= 0.0
    }
}

/// Defense rating. Carried on every monster but not applied to damage.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Defense {
    pub value: f32,
}

/// Decaying displacement impulse left behind by a strike.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    pub force: f32,
    /// Radians, attacker-to-target.
    pub direction: f32,
    /// Seconds left before the impulse goes inert.
    pub remaining: f32,
}

impl Knockback {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Level-scaled movement speed, units per second.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveSpeed(pub f32);

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Elemental kind of a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonsterType {
    Fire,
    Water,
    Earth,
    Air,
}

impl MonsterType {
    pub const ALL: [MonsterType; 4] = [
        MonsterType::Fire,
        MonsterType::Water,
        MonsterType::Earth,
        MonsterType::Air,
    ];

    pub fn index(self) -> u32 {
        match self {
            MonsterType::Fire => 0,
            MonsterType::Water => 1,
            MonsterType::Earth => 2,
            MonsterType::Air => 3,
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MonsterType::Fire => "FIRE",
            MonsterType::Water => "WATER",
            MonsterType::Earth => "EARTH",
            MonsterType::Air => "AIR",
        }
    }
}

impl TryFrom<u32> for MonsterType {
    type Error = SimError;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(SimError::UnknownMonsterType {
            index,
            configured: Self::ALL.len() as u32,
        })
    }
}

/// Monster identity: kind and level (>= 1).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub kind: MonsterType,
    pub level: u32,
}

/// Whether this monster may fuse with an overlapping monster of its kind.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mergeable {
    pub can_merge: bool,
}

/// Marker for monsters steered by the player.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerControlled;

/// Marker for hostile monsters.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Enemy;

/// Set by the collision system on every collider overlapping another this frame.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Overlap;

// ============================================================================
// AI COMPONENTS
// ============================================================================

/// Enemy decision state. Discriminants match the wire encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AiState {
    #[default]
    Idle = 0,
    Chase = 1,
    Attack = 2,
}

/// Enemy brain.
///
/// `target` is a weak reference: it may name a despawned entity and must be
/// revalidated before every use.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Ai {
    pub state: AiState,
    pub target: Option<Entity>,
    pub detection_range: f32,
    pub decision_timer: f32,
}

impl Ai {
    pub fn idle(detection_range: f32) -> Self {
        Self {
            state: AiState::Idle,
            target: None,
            detection_range,
            decision_timer: 0.0,
        }
    }
}

impl Default for Ai {
    fn default() -> Self {
        Self::idle(AI_DETECTION_RANGE)
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Components shared by every monster, player or enemy.
#[derive(Bundle)]
pub struct MonsterBundle {
    pub monster: Monster,
    pub position: Position,
    pub velocity: Velocity,
    pub health: Health,
    pub attack: Attack,
    pub defense: Defense,
    pub mergeable: Mergeable,
    pub collider: Collider,
    pub speed: MoveSpeed,
}

impl MonsterBundle {
    /// Build a monster with stats scaled for `(kind, level)`.
    pub fn new(kind: MonsterType, level: u32, position: Position, can_merge: bool) -> Self {
        let stats = calculate_monster_stats(kind, level);
        Self::from_stats(kind, level.max(1), position, can_merge, &stats)
    }

    fn from_stats(
        kind: MonsterType,
        level: u32,
        position: Position,
        can_merge: bool,
        stats: &MonsterStats,
    ) -> Self {
        let radius = stats.radius as f32;
        Self {
            monster: Monster { kind, level },
            position,
            velocity: Velocity::zero(),
            health: Health::new(stats.health as f32),
            attack: Attack::new(
                stats.attack as f32,
                radius * ATTACK_RANGE_RADIUS_FACTOR + ATTACK_RANGE_BONUS,
                ATTACK_COOLDOWN,
            ),
            defense: Defense {
                value: stats.defense as f32,
            },
            mergeable: Mergeable { can_merge },
            collider: Collider::solid(radius),
            speed: MoveSpeed(stats.speed as f32),
        }
    }
}

/// Bundle for a player monster. Player monsters start mergeable.
#[derive(Bundle)]
pub struct PlayerMonsterBundle {
    pub base: MonsterBundle,
    pub marker: PlayerControlled,
}

impl PlayerMonsterBundle {
    pub fn new(kind: MonsterType, level: u32, position: Position) -> Self {
        Self {
            base: MonsterBundle::new(kind, level, position, true),
            marker: PlayerControlled,
        }
    }
}

/// Bundle for an enemy monster: never mergeable, starts idle.
#[derive(Bundle)]
pub struct EnemyMonsterBundle {
    pub base: MonsterBundle,
    pub ai: Ai,
    pub marker: Enemy,
}

impl EnemyMonsterBundle {
    pub fn new(kind: MonsterType, level: u32, position: Position) -> Self {
        Self {
            base: MonsterBundle::new(kind, level, position, false),
            ai: Ai::default(),
            marker: Enemy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage_clamps_at_zero() {
        let mut health = Health::new(50.0);
        health.damage(15.0);
        assert_eq!(health.current, 35.0);
        health.damage(100.0);
        assert_eq!(health.current, 0.0);
        assert!(health.is_dead());
        assert_eq!(health.max(), 50.0);
    }

    #[test]
    fn test_monster_type_index_roundtrip() {
        for kind in MonsterType::ALL {
            assert_eq!(MonsterType::from_index(kind.index()), Some(kind));
        }
        assert!(MonsterType::try_from(4).is_err());
    }

    #[test]
    fn test_bundle_derives_combat_values_from_stats() {
        let bundle = MonsterBundle::new(MonsterType::Fire, 1, Position::new(1.0, 2.0), true);
        assert_eq!(bundle.health.max(), 80.0);
        assert_eq!(bundle.attack.damage, 15.0);
        assert_eq!(bundle.collider.radius, 20.0);
        assert_eq!(bundle.attack.range, 50.0);
        assert!(bundle.attack.is_ready());
        assert!(bundle.mergeable.can_merge);
    }

    #[test]
    fn test_enemy_bundle_is_never_mergeable() {
        let bundle = EnemyMonsterBundle::new(MonsterType::Air, 2, Position::default());
        assert!(!bundle.base.mergeable.can_merge);
        assert_eq!(bundle.ai.state, AiState::Idle);
    }
}
