//! Attack system - cooldown-gated melee resolution.
//!
//! ## Resolution order
//!
//! Attackers are visited in ascending [`Entity`] order, and each ready
//! attacker scans damageable entities in ascending [`Entity`] order. The
//! first target inside range is struck: first match, not nearest match. The
//! order is fixed so that tie-breaks do not depend on archetype layout.
//!
//! ## Phases
//!
//! 1. **Cooldown** - every attacker's timer drops by the frame delta. The
//!    timer may go negative; only its sign matters.
//! 2. **Resolve** - each ready attacker strikes at most once: damage, a
//!    knockback impulse on the target, a cooldown reset, and a
//!    `MonsterDamaged` event.
//!
//! Defense is not subtracted from incoming damage.

use crate::components::*;
use crate::events::{EventQueue, SimEvent};
use crate::spatial::sort_by_entity;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use tracing::debug;

/// Knockback force per point of damage dealt.
pub const KNOCKBACK_FORCE_PER_DAMAGE: f32 = 10.0;
/// Seconds a fresh knockback stays active.
pub const KNOCKBACK_DURATION: f32 = 0.2;

/// System that resolves melee strikes.
///
/// ## Data Access
/// - Reads: DeltaTime, Position
/// - Writes: Attack, Health, Knockback (deferred insert), EventQueue
pub fn attack_system(
    dt: Res<DeltaTime>,
    mut commands: Commands,
    mut events: ResMut<EventQueue>,
    mut attackers: Query<(Entity, &Position, &mut Attack)>,
    mut damageable: Query<(Entity, &Position, &mut Health)>,
) {
    let delta = dt.0;

    for (_, _, mut attack) in attackers.iter_mut() {
        attack.timer -= delta;
    }

    let mut ready: Vec<(Entity, (Position, Attack))> = attackers
        .iter()
        .filter(|(_, _, attack)| attack.is_ready())
        .map(|(entity, pos, attack)| (entity, (*pos, *attack)))
        .collect();
    sort_by_entity(&mut ready);

    let mut targets: Vec<(Entity, Position)> = damageable
        .iter()
        .map(|(entity, pos, _)| (entity, *pos))
        .collect();
    sort_by_entity(&mut targets);

    for (attacker, (attacker_pos, attack)) in ready {
        let hit = targets
            .iter()
            .find(|(target, pos)| *target != attacker && attacker_pos.distance_to(pos) <= attack.range);
        let Some(&(target, target_pos)) = hit else {
            continue;
        };

        if let Ok((_, _, mut health)) = damageable.get_mut(target) {
            health.damage(attack.damage);
        }

        let direction = (target_pos.y - attacker_pos.y).atan2(target_pos.x - attacker_pos.x);
        commands.entity(target).try_insert(Knockback {
            force: attack.damage * KNOCKBACK_FORCE_PER_DAMAGE,
            direction,
            remaining: KNOCKBACK_DURATION,
        });

        if let Ok((_, _, mut own)) = attackers.get_mut(attacker) {
            own.timer = own.cooldown;
        }

        debug!(?attacker, ?target, damage = attack.damage, "strike");
        events.push(SimEvent::MonsterDamaged {
            entity: target,
            attacker,
            damage: attack.damage,
            position: target_pos,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(delta: f32) -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(delta));
        world.insert_resource(EventQueue::default());
        world
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(attack_system);
        schedule.run(world);
    }

    fn damage_events(world: &mut World) -> Vec<SimEvent> {
        world
            .resource_mut::<EventQueue>()
            .drain()
            .into_iter()
            .filter(|e| matches!(e, SimEvent::MonsterDamaged { .. }))
            .collect()
    }

    #[test]
    fn test_strike_scenario() {
        let mut world = world_with(0.016);
        let attacker = world
            .spawn((
                Position::new(0.0, 0.0),
                Attack {
                    damage: 15.0,
                    range: 10.0,
                    cooldown: 1.0,
                    timer: 0.0,
                },
            ))
            .id();
        let target = world
            .spawn((Position::new(5.0, 0.0), Health::new(50.0)))
            .id();

        run(&mut world);

        assert_eq!(world.get::<Health>(target).unwrap().current, 35.0);
        let knockback = world.get::<Knockback>(target).unwrap();
        assert!(knockback.direction.abs() < 1e-6);
        assert!((knockback.remaining - 0.2).abs() < 1e-6);
        assert!((knockback.force - 150.0).abs() < 1e-4);
        assert_eq!(world.get::<Attack>(attacker).unwrap().timer, 1.0);

        let events = damage_events(&mut world);
        assert_eq!(
            events,
            vec![SimEvent::MonsterDamaged {
                entity: target,
                attacker,
                damage: 15.0,
                position: Position::new(5.0, 0.0),
            }]
        );
    }

    #[test]
    fn test_one_strike_per_attacker_first_match() {
        let mut world = world_with(0.016);
        let attacker = world
            .spawn((Position::new(0.0, 0.0), Attack::new(5.0, 50.0, 1.0)))
            .id();
        let first = world.spawn((Position::new(40.0, 0.0), Health::new(20.0))).id();
        let second = world.spawn((Position::new(10.0, 0.0), Health::new(20.0))).id();

        run(&mut world);

        // `first` has the lower id, so it is struck even though `second` is nearer.
        assert!(first < second);
        assert_eq!(world.get::<Health>(first).unwrap().current, 15.0);
        assert_eq!(world.get::<Health>(second).unwrap().current, 20.0);
        let events = damage_events(&mut world);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SimEvent::MonsterDamaged { attacker: a, .. } if a == attacker));
    }

    #[test]
    fn test_no_strike_while_cooling_down() {
        let mut world = world_with(0.016);
        world.spawn((
            Position::new(0.0, 0.0),
            Attack {
                damage: 5.0,
                range: 50.0,
                cooldown: 1.0,
                timer: 0.5,
            },
        ));
        let target = world.spawn((Position::new(10.0, 0.0), Health::new(20.0))).id();

        run(&mut world);

        assert_eq!(world.get::<Health>(target).unwrap().current, 20.0);
        assert!(world.get::<Knockback>(target).is_none());
        assert!(damage_events(&mut world).is_empty());
    }

    #[test]
    fn test_attacker_never_strikes_itself() {
        let mut world = world_with(0.016);
        let lone = world
            .spawn((Position::new(0.0, 0.0), Attack::new(5.0, 50.0, 1.0), Health::new(20.0)))
            .id();

        run(&mut world);

        assert_eq!(world.get::<Health>(lone).unwrap().current, 20.0);
        assert!(world.get::<Attack>(lone).unwrap().timer < 0.0);
    }

    #[test]
    fn test_cooldown_gates_repeat_strikes() {
        let mut world = world_with(0.0625);
        world.spawn((Position::new(0.0, 0.0), Attack::new(1.0, 50.0, 0.125)));
        let target = world.spawn((Position::new(10.0, 0.0), Health::new(100.0))).id();

        for _ in 0..4 {
            run(&mut world);
        }

        // Strikes on frames 1 and 3: the cooldown spans two decays.
        assert_eq!(damage_events(&mut world).len(), 2);
        assert_eq!(world.get::<Health>(target).unwrap().current, 98.0);
    }
}
