//! Spawn system - timed enemy waves from the arena edges.

use crate::components::*;
use crate::config::SimConfig;
use crate::events::{EventQueue, SimEvent};
use crate::resources::{GameRng, SpawnTimer};
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use tracing::debug;

/// Distance from the arena border at which enemies appear.
pub const SPAWN_EDGE_INSET: f32 = 20.0;
/// Interval jitter: the next spawn comes after `base * [0.8, 1.2)` seconds.
pub const SPAWN_JITTER_MIN: f32 = 0.8;
pub const SPAWN_JITTER_MAX: f32 = 1.2;

/// Enemy level for a uniform roll in `[0, 1)`.
pub fn spawn_level_for_roll(roll: f32) -> u32 {
    if roll > 0.95 {
        3
    } else if roll > 0.8 {
        2
    } else {
        1
    }
}

/// Pick a point just inside one of the four arena edges.
pub fn edge_spawn_position(rng: &mut GameRng, width: f32, height: f32) -> Position {
    let horizontal = rng.coin_flip();
    let near = rng.coin_flip();
    if horizontal {
        let y = if near { SPAWN_EDGE_INSET } else { height - SPAWN_EDGE_INSET };
        Position::new(rng.random_range(0.0, width), y)
    } else {
        let x = if near { SPAWN_EDGE_INSET } else { width - SPAWN_EDGE_INSET };
        Position::new(x, rng.random_range(0.0, height))
    }
}

/// System that spawns one enemy each time the spawn timer runs out.
///
/// ## Data Access
/// - Reads: DeltaTime, SimConfig
/// - Writes: SpawnTimer, GameRng, EventQueue, spawns (deferred)
pub fn spawn_system(
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    mut timer: ResMut<SpawnTimer>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    mut events: ResMut<EventQueue>,
) {
    timer.0 -= dt.0;
    if timer.0 > 0.0 {
        return;
    }
    timer.0 = config.base_spawn_interval * rng.random_range(SPAWN_JITTER_MIN, SPAWN_JITTER_MAX);

    let position = edge_spawn_position(&mut rng, config.arena_width, config.arena_height);
    let index = rng.random_index(config.monster_type_count);
    let kind = MonsterType::ALL[index as usize];
    let level = spawn_level_for_roll(rng.random_f32()).min(config.max_level);

    let entity = commands.spawn(EnemyMonsterBundle::new(kind, level, position)).id();
    debug!(?entity, kind = kind.as_str(), level, x = position.x, y = position.y, "enemy spawned");
    events.push(SimEvent::MonsterSpawned {
        entity,
        position,
        kind,
        level,
        is_player: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(delta: f32, interval: f32) -> World {
        let mut world = World::new();
        let config = SimConfig {
            base_spawn_interval: interval,
            rng_seed: Some(7),
            ..Default::default()
        };
        world.insert_resource(DeltaTime(delta));
        world.insert_resource(SpawnTimer(interval));
        world.insert_resource(GameRng::from_config(&config));
        world.insert_resource(config);
        world.insert_resource(EventQueue::default());
        world
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(spawn_system);
        schedule.run(world);
    }

    fn enemy_count(world: &mut World) -> usize {
        world.query_filtered::<Entity, With<Enemy>>().iter(world).count()
    }

    #[test]
    fn test_level_rolls() {
        assert_eq!(spawn_level_for_roll(0.99), 3);
        assert_eq!(spawn_level_for_roll(0.85), 2);
        assert_eq!(spawn_level_for_roll(0.5), 1);
        assert_eq!(spawn_level_for_roll(0.95), 2);
        assert_eq!(spawn_level_for_roll(0.8), 1);
    }

    #[test]
    fn test_one_enemy_after_interval() {
        let mut w = world(0.0625, 3.0);
        for _ in 0..47 {
            run(&mut w);
        }
        assert_eq!(enemy_count(&mut w), 0);
        assert!(w.resource::<EventQueue>().is_empty());

        run(&mut w);
        assert_eq!(enemy_count(&mut w), 1);

        let events = w.resource_mut::<EventQueue>().drain();
        assert_eq!(events.len(), 1);
        let SimEvent::MonsterSpawned { entity, is_player, level, kind, .. } = events[0] else {
            panic!("expected a spawn event, got {:?}", events[0]);
        };
        assert!(!is_player);
        assert!((1..=3).contains(&level));
        assert_eq!(*w.get::<Monster>(entity).unwrap(), Monster { kind, level });
        assert!(!w.get::<Mergeable>(entity).unwrap().can_merge);
        assert_eq!(w.get::<Ai>(entity).unwrap().state, AiState::Idle);
    }

    #[test]
    fn test_timer_resets_with_jitter() {
        let mut w = world(0.05, 0.04);
        run(&mut w);
        let next = w.resource::<SpawnTimer>().0;
        assert!(next >= 0.04 * SPAWN_JITTER_MIN && next <= 0.04 * SPAWN_JITTER_MAX);
    }

    #[test]
    fn test_level_capped_by_config() {
        let mut w = world(1.0, 0.5);
        w.resource_mut::<SimConfig>().max_level = 1;
        for _ in 0..40 {
            run(&mut w);
        }
        let mut query = w.query::<&Monster>();
        assert!(query.iter(&w).all(|m| m.level == 1));
        assert_eq!(query.iter(&w).count(), 40);
    }

    #[test]
    fn test_kinds_cover_configured_types_only() {
        let mut w = world(1.0, 0.5);
        w.resource_mut::<SimConfig>().monster_type_count = 2;
        for _ in 0..60 {
            run(&mut w);
        }
        let mut query = w.query::<&Monster>();
        let kinds: Vec<MonsterType> = query.iter(&w).map(|m| m.kind).collect();
        assert_eq!(kinds.len(), 60);
        assert!(kinds.iter().all(|k| matches!(k, MonsterType::Fire | MonsterType::Water)));
        assert!(kinds.contains(&MonsterType::Water));
    }

    #[test]
    fn test_spawn_points_hug_the_edges() {
        let mut rng = GameRng::from_seed(99);
        for _ in 0..200 {
            let p = edge_spawn_position(&mut rng, 800.0, 600.0);
            let on_vertical = p.x == SPAWN_EDGE_INSET || p.x == 800.0 - SPAWN_EDGE_INSET;
            let on_horizontal = p.y == SPAWN_EDGE_INSET || p.y == 600.0 - SPAWN_EDGE_INSET;
            assert!(on_vertical || on_horizontal, "{p:?} is not on an edge");
            assert!((0.0..800.0).contains(&p.x));
            assert!((0.0..600.0).contains(&p.y));
        }
    }
}
