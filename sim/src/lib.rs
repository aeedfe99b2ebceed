//! Monster Merge Arena - Simulation Core
//!
//! A deterministic, frame-stepped ECS simulation of a 2D arena where player
//! monsters fight waves of enemies and fuse with their own kind.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod resources;
pub mod spatial;
pub mod stats;
pub mod systems;
pub mod world;

pub use api::SimWorld;
pub use components::*;
pub use config::{SimConfig, MAX_MONSTER_TYPES};
pub use error::{SimError, SimResult};
pub use events::{events_to_json, EventListener, EventQueue, SimEvent};
pub use resources::*;
pub use spatial::{SpatialEntry, SpatialGrid};
pub use stats::{base_stats, calculate_monster_stats, MonsterStats, MAX_LEVEL_LIMIT};
pub use systems::*;
pub use world::{MonsterSnapshot, Snapshot};
