//! World-level resources shared by the frame pipeline.

use crate::config::SimConfig;
use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Ordered ids of the monsters under player control.
///
/// Purged on death and merge. Ids are still weak: check liveness before use.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerEntities(pub Vec<Entity>);

impl PlayerEntities {
    pub fn contains(&self, entity: Entity) -> bool {
        self.0.contains(&entity)
    }

    pub fn push(&mut self, entity: Entity) {
        if !self.contains(entity) {
            self.0.push(entity);
        }
    }

    /// Remove `entity`, keeping the order of the rest. Returns whether it was present.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.0.len();
        self.0.retain(|&e| e != entity);
        self.0.len() != before
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.0.iter().copied()
    }
}

/// Seconds until the next forced enemy spawn.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SpawnTimer(pub f32);

/// Scratch queue of entities found dead this frame.
#[derive(Resource, Debug, Default)]
pub struct DeadEntities(pub Vec<Entity>);

/// Scratch queue of entities consumed by merges this frame.
#[derive(Resource, Debug, Default)]
pub struct EntitiesToRemove(pub Vec<Entity>);

/// Random source for spawning.
///
/// A seeded instance replays the same spawn sequence; without a seed it draws
/// from system entropy.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        match config.rng_seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    /// Uniform f32 in `[0, 1)`.
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Uniform f32 in `[min, max)`.
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Uniform index in `0..count`. `count` must be non-zero.
    pub fn random_index(&mut self, count: u32) -> u32 {
        self.rng.gen_range(0..count)
    }

    pub fn coin_flip(&mut self) -> bool {
        self.random_f32() < 0.5
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
