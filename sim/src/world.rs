//! Snapshot types for the simulation.
//!
//! The `Snapshot` struct provides a serializable, read-only view of the arena
//! between frames, for renderers, UIs and tests.

use crate::components::*;
use crate::resources::PlayerEntities;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single monster's state for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterSnapshot {
    /// `Entity::to_bits`; stable for the life of the monster.
    pub id: u64,
    pub kind: MonsterType,
    pub level: u32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub health: f32,
    pub health_max: f32,
    pub radius: f32,
    pub is_player: bool,
    /// Present for AI-driven enemies only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_state: Option<AiState>,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Frames run so far.
    pub tick: u64,
    /// Elapsed simulation time in seconds (sum of clamped deltas).
    pub time: f32,
    /// All monsters, in ascending id order.
    pub monsters: Vec<MonsterSnapshot>,
    /// Player-controlled ids, in the order they were acquired.
    pub player_entities: Vec<u64>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let mut query = world.query::<(
            Entity,
            &Monster,
            &Position,
            Option<&Velocity>,
            &Health,
            &Collider,
            Has<PlayerControlled>,
            Option<&Ai>,
        )>();

        let mut monsters: Vec<MonsterSnapshot> = query
            .iter(world)
            .map(|(entity, monster, pos, vel, health, collider, is_player, ai)| {
                let vel = vel.copied().unwrap_or_default();
                MonsterSnapshot {
                    id: entity.to_bits(),
                    kind: monster.kind,
                    level: monster.level,
                    x: pos.x,
                    y: pos.y,
                    vx: vel.vx,
                    vy: vel.vy,
                    health: health.current.max(0.0),
                    health_max: health.max(),
                    radius: collider.radius,
                    is_player,
                    ai_state: ai.map(|ai| ai.state),
                }
            })
            .collect();
        monsters.sort_by_key(|m| m.id);

        let player_entities = world
            .get_resource::<PlayerEntities>()
            .map(|players| {
                players
                    .iter()
                    .filter(|&e| world.entities().contains(e))
                    .map(Entity::to_bits)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            tick,
            time,
            monsters,
            player_entities,
        }
    }

    /// Look up a monster by entity.
    pub fn monster(&self, entity: Entity) -> Option<&MonsterSnapshot> {
        let id = entity.to_bits();
        self.monsters.iter().find(|m| m.id == id)
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a snapshot produced by [`Snapshot::to_json`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
