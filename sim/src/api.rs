//! Public API for the simulation.
//!
//! This module provides the main interface for a host (renderer, UI, tests)
//! to drive the arena.
//!
//! ## Frames
//!
//! A host calls [`SimWorld::advance_frame`] with a monotonic timestamp in
//! milliseconds, or [`SimWorld::step`] with an explicit delta. Either way one
//! frame runs the whole pipeline once with `delta` clamped to
//! `[0, MAX_FRAME_DELTA]`, so a long stall never produces a huge jump.
//!
//! ## Requests
//!
//! Player input arrives between frames through `request_*` methods. Inputs are
//! validated here; once a frame starts nothing can fail.

use crate::components::*;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::events::{dispatch_events, EventListener, EventQueue, SimEvent};
use crate::resources::*;
use crate::spatial::SpatialGrid;
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use tracing::{debug, info, trace};

/// Distance from the arena centre at which initial player monsters are placed.
const INITIAL_RING_RADIUS: f32 = 60.0;

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Initializing the arena
/// - Advancing it frame by frame
/// - Extracting state snapshots
/// - Accepting player requests
/// - Delivering events to listeners
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    config: SimConfig,
    tick: u64,
    time: f32,
    /// Timestamp of the previous `advance_frame` call, in milliseconds.
    last_timestamp_ms: f64,
    listeners: Vec<Box<dyn EventListener>>,
}

impl SimWorld {
    /// Create a world with the default configuration.
    pub fn new() -> Self {
        Self::build(SimConfig::default())
    }

    /// Create a world with a custom configuration.
    pub fn with_config(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(DeltaTime(0.0));
        world.insert_resource(SpatialGrid::default());
        world.insert_resource(EventQueue::default());
        world.insert_resource(DeadEntities::default());
        world.insert_resource(EntitiesToRemove::default());
        world.insert_resource(PlayerEntities::default());
        world.insert_resource(SpawnTimer(config.base_spawn_interval));
        world.insert_resource(GameRng::from_config(&config));
        world.insert_resource(config.clone());

        let mut sim = Self {
            world,
            schedule: build_frame_schedule(),
            config,
            tick: 0,
            time: 0.0,
            last_timestamp_ms: 0.0,
            listeners: Vec::new(),
        };
        sim.spawn_initial_players();

        info!(
            width = sim.config.arena_width,
            height = sim.config.arena_height,
            players = sim.config.initial_player_monsters,
            seed = ?sim.config.rng_seed,
            "arena created"
        );
        sim
    }

    /// Place the starting player monsters on a ring around the arena centre.
    fn spawn_initial_players(&mut self) {
        let count = self.config.initial_player_monsters;
        let cx = self.config.arena_width * 0.5;
        let cy = self.config.arena_height * 0.5;
        for i in 0..count {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let position = Position::new(
                cx + INITIAL_RING_RADIUS * angle.cos(),
                cy + INITIAL_RING_RADIUS * angle.sin(),
            );
            let kind = MonsterType::ALL[(i % self.config.monster_type_count) as usize];
            self.spawn_player(kind, 1, position);
        }
    }

    fn spawn_player(&mut self, kind: MonsterType, level: u32, position: Position) -> Entity {
        let entity = self.world.spawn(PlayerMonsterBundle::new(kind, level, position)).id();
        if let Some(mut players) = self.world.get_resource_mut::<PlayerEntities>() {
            players.push(entity);
        }
        if let Some(mut queue) = self.world.get_resource_mut::<EventQueue>() {
            queue.push(SimEvent::MonsterSpawned {
                entity,
                position,
                kind,
                level,
                is_player: true,
            });
        }
        debug!(?entity, kind = kind.as_str(), level, "player monster created");
        entity
    }

    /// Advance one frame to `timestamp_ms`.
    ///
    /// The delta is the time since the previous call (or since 0 for the first
    /// call), clamped to `[0, MAX_FRAME_DELTA]` seconds. Non-finite or
    /// decreasing timestamps are rejected and leave the world untouched.
    /// Returns the events produced by the frame, in order.
    pub fn advance_frame(&mut self, timestamp_ms: f64) -> SimResult<Vec<SimEvent>> {
        if !timestamp_ms.is_finite() {
            return Err(SimError::NonFiniteTimestamp(timestamp_ms));
        }
        if timestamp_ms < self.last_timestamp_ms {
            return Err(SimError::NonMonotonicTimestamp {
                previous: self.last_timestamp_ms,
                current: timestamp_ms,
            });
        }
        let raw = ((timestamp_ms - self.last_timestamp_ms) / 1000.0) as f32;
        self.last_timestamp_ms = timestamp_ms;
        Ok(self.run_frame(raw))
    }

    /// Run one frame with an explicit delta in seconds (clamped like
    /// `advance_frame`). Does not touch the timestamp clock.
    pub fn step(&mut self, dt: f32) -> Vec<SimEvent> {
        self.run_frame(dt)
    }

    fn run_frame(&mut self, raw_delta: f32) -> Vec<SimEvent> {
        let delta = DeltaTime::clamped(raw_delta);
        self.world.insert_resource(delta);

        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += delta.0;

        let events = self
            .world
            .get_resource_mut::<EventQueue>()
            .map(|mut queue| queue.drain())
            .unwrap_or_default();
        trace!(tick = self.tick, delta = delta.0, events = events.len(), "frame complete");
        dispatch_events(&mut self.listeners, &events);
        events
    }

    /// Set the velocity of a player monster.
    ///
    /// Ignored when `entity` is not a live player monster or the velocity is
    /// not finite.
    pub fn request_player_move(&mut self, entity: Entity, vx: f32, vy: f32) {
        if !vx.is_finite() || !vy.is_finite() {
            debug!(?entity, vx, vy, "ignoring non-finite move request");
            return;
        }
        if !self.is_player(entity) {
            debug!(?entity, "ignoring move request for unknown player monster");
            return;
        }
        if let Some(mut velocity) = self.world.get_mut::<Velocity>(entity) {
            *velocity = Velocity::new(vx, vy);
        }
    }

    /// Create a player monster at `(x, y)`.
    ///
    /// The monster exists as soon as this returns; its `MonsterSpawned` event
    /// is delivered with the next frame.
    pub fn request_create_player_monster(
        &mut self,
        x: f32,
        y: f32,
        kind: MonsterType,
        level: u32,
    ) -> SimResult<Entity> {
        if kind.index() >= self.config.monster_type_count {
            return Err(SimError::UnknownMonsterType {
                index: kind.index(),
                configured: self.config.monster_type_count,
            });
        }
        if level == 0 || level > self.config.max_level {
            return Err(SimError::InvalidLevel {
                level,
                max: self.config.max_level,
            });
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(SimError::NonFinitePosition { x, y });
        }
        Ok(self.spawn_player(kind, level, Position::new(x, y)))
    }

    /// Register a listener for every event from now on.
    pub fn subscribe<L>(&mut self, listener: L)
    where
        L: EventListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Get a snapshot of the current arena state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Live player monsters, in the order they were acquired.
    pub fn player_entities(&self) -> Vec<Entity> {
        self.world
            .get_resource::<PlayerEntities>()
            .map(|players| players.iter().filter(|&e| self.is_alive(e)).collect())
            .unwrap_or_default()
    }

    fn is_player(&self, entity: Entity) -> bool {
        self.is_alive(entity)
            && self
                .world
                .get_resource::<PlayerEntities>()
                .is_some_and(|players| players.contains(entity))
    }

    /// Whether `entity` still names a live entity.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world.entities().contains(entity)
    }

    /// Number of monsters in the arena.
    pub fn monster_count(&mut self) -> usize {
        let mut query = self.world.query::<&Monster>();
        query.iter(&self.world).count()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get the number of frames run so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time in seconds.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
