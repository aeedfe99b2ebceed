//! AI system - enemy decision state machine.
//!
//! Each enemy carries an [`Ai`] brain. On a fixed cadence it looks for the
//! nearest live player monster inside its detection range; every frame it
//! steers toward that target, or stops once the target is within its own
//! attack range so the attack system can take over.

use crate::components::*;
use crate::resources::PlayerEntities;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use tracing::trace;

/// Seconds between target re-evaluations.
pub const AI_DECISION_INTERVAL: f32 = 0.5;

/// Nearest candidate within `range` of `from`; equal distances go to the lowest entity.
pub fn nearest_target(
    from: &Position,
    range: f32,
    candidates: &[(Entity, Position)],
) -> Option<(Entity, Position)> {
    let mut best: Option<(Entity, Position, f32)> = None;
    for &(entity, pos) in candidates {
        let dist = from.distance_to(&pos);
        if dist > range {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_entity, _, best_dist)) => {
                dist < best_dist || (dist == best_dist && entity < best_entity)
            }
        };
        if better {
            best = Some((entity, pos, dist));
        }
    }
    best.map(|(entity, pos, _)| (entity, pos))
}

/// System that advances enemy brains and writes their velocity.
///
/// ## Data Access
/// - Reads: DeltaTime, PlayerEntities, Position, MoveSpeed, Attack
/// - Writes: Velocity, Ai
pub fn ai_system(
    dt: Res<DeltaTime>,
    players: Res<PlayerEntities>,
    targets: Query<&Position, With<PlayerControlled>>,
    mut ai_query: Query<(
        Entity,
        &Position,
        &MoveSpeed,
        Option<&Attack>,
        &mut Velocity,
        &mut Ai,
    )>,
) {
    let delta = dt.0;

    // Stale ids in the player list are skipped here rather than trusted.
    let candidates: Vec<(Entity, Position)> = players
        .iter()
        .filter_map(|entity| targets.get(entity).ok().map(|pos| (entity, *pos)))
        .collect();

    for (entity, pos, speed, attack, mut vel, mut ai) in ai_query.iter_mut() {
        ai.decision_timer -= delta;

        let mut target_pos = ai.target.and_then(|target| targets.get(target).ok().copied());
        if ai.target.is_some() && target_pos.is_none() {
            trace!(?entity, "ai target no longer valid, re-acquiring");
            ai.target = None;
            ai.decision_timer = 0.0;
        }

        if ai.decision_timer <= 0.0 {
            ai.decision_timer = AI_DECISION_INTERVAL;
            let acquired = nearest_target(pos, ai.detection_range, &candidates);
            ai.target = acquired.map(|(target, _)| target);
            target_pos = acquired.map(|(_, p)| p);
            ai.state = if ai.target.is_some() {
                AiState::Chase
            } else {
                AiState::Idle
            };
        }

        let Some(goal) = target_pos else {
            *vel = Velocity::zero();
            ai.state = AiState::Idle;
            continue;
        };

        let dist = pos.distance_to(&goal);
        let reach = attack.map(|a| a.range).unwrap_or(0.0);
        if dist <= reach {
            *vel = Velocity::zero();
            ai.state = AiState::Attack;
        } else {
            let dx = goal.x - pos.x;
            let dy = goal.y - pos.y;
            *vel = Velocity::new(dx / dist * speed.0, dy / dist * speed.0);
            ai.state = AiState::Chase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(players: &[(f32, f32)]) -> (World, Vec<Entity>) {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.05));
        let ids: Vec<Entity> = players
            .iter()
            .map(|&(x, y)| world.spawn((Position::new(x, y), PlayerControlled)).id())
            .collect();
        world.insert_resource(PlayerEntities(ids.clone()));
        (world, ids)
    }

    fn spawn_enemy(world: &mut World, x: f32, y: f32) -> Entity {
        world
            .spawn((
                Position::new(x, y),
                Velocity::zero(),
                MoveSpeed(100.0),
                Attack::new(10.0, 30.0, 1.0),
                Ai::idle(300.0),
            ))
            .id()
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(ai_system);
        schedule.run(world);
    }

    #[test]
    fn test_chases_nearest_player() {
        let (mut world, players) = setup(&[(200.0, 0.0), (100.0, 0.0)]);
        let enemy = spawn_enemy(&mut world, 0.0, 0.0);
        run(&mut world);

        let ai = world.get::<Ai>(enemy).unwrap();
        assert_eq!(ai.target, Some(players[1]));
        assert_eq!(ai.state, AiState::Chase);
        let vel = world.get::<Velocity>(enemy).unwrap();
        assert!((vel.vx - 100.0).abs() < 0.001);
        assert!(vel.vy.abs() < 0.001);
    }

    #[test]
    fn test_equal_distance_prefers_lowest_entity() {
        let (mut world, players) = setup(&[(100.0, 0.0), (-100.0, 0.0)]);
        let enemy = spawn_enemy(&mut world, 0.0, 0.0);
        run(&mut world);

        let lowest = players.iter().copied().min().unwrap();
        assert_eq!(world.get::<Ai>(enemy).unwrap().target, Some(lowest));
    }

    #[test]
    fn test_idle_when_nothing_in_range() {
        let (mut world, _) = setup(&[(1000.0, 0.0)]);
        let enemy = spawn_enemy(&mut world, 0.0, 0.0);
        run(&mut world);

        let ai = world.get::<Ai>(enemy).unwrap();
        assert_eq!(ai.target, None);
        assert_eq!(ai.state, AiState::Idle);
        assert!(world.get::<Velocity>(enemy).unwrap().is_zero());
    }

    #[test]
    fn test_stops_inside_attack_range() {
        let (mut world, _) = setup(&[(20.0, 0.0)]);
        let enemy = spawn_enemy(&mut world, 0.0, 0.0);
        run(&mut world);

        assert_eq!(world.get::<Ai>(enemy).unwrap().state, AiState::Attack);
        assert!(world.get::<Velocity>(enemy).unwrap().is_zero());
    }

    #[test]
    fn test_stale_target_is_reacquired() {
        let (mut world, players) = setup(&[(100.0, 0.0), (150.0, 0.0)]);
        let enemy = spawn_enemy(&mut world, 0.0, 0.0);
        run(&mut world);
        assert_eq!(world.get::<Ai>(enemy).unwrap().target, Some(players[0]));

        // Despawn the target but leave its stale id in the player list.
        world.despawn(players[0]);
        run(&mut world);

        let ai = world.get::<Ai>(enemy).unwrap();
        assert_eq!(ai.target, Some(players[1]));
        assert_eq!(ai.state, AiState::Chase);
    }

    #[test]
    fn test_keeps_target_between_decisions() {
        let (mut world, players) = setup(&[(100.0, 0.0)]);
        let enemy = spawn_enemy(&mut world, 0.0, 0.0);
        run(&mut world);
        let timer_after_first = world.get::<Ai>(enemy).unwrap().decision_timer;
        assert!((timer_after_first - AI_DECISION_INTERVAL).abs() < 1e-6);

        run(&mut world);
        let ai = world.get::<Ai>(enemy).unwrap();
        assert_eq!(ai.target, Some(players[0]));
        assert!((ai.decision_timer - (AI_DECISION_INTERVAL - 0.05)).abs() < 1e-6);
    }
}
