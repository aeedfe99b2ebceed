//! Movement system - applies velocity to position.

use crate::components::*;
use bevy_ecs::prelude::*;

/// Upper bound on a single frame's delta, so a stalled host cannot produce
/// one huge physics step.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Resource containing the delta time for the current frame.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct DeltaTime(pub f32);

impl DeltaTime {
    /// Clamp a raw delta into `[0, MAX_FRAME_DELTA]`.
    pub fn clamped(raw: f32) -> Self {
        if raw.is_finite() {
            Self(raw.clamp(0.0, MAX_FRAME_DELTA))
        } else {
            Self(0.0)
        }
    }
}

/// System that integrates velocity into position.
///
/// Arena bounds are not enforced here; the collision system clamps later in
/// the frame.
pub fn movement_system(dt: Res<DeltaTime>, mut query: Query<(&mut Position, &Velocity)>) {
    let delta = dt.0;
    for (mut pos, vel) in query.iter_mut() {
        if vel.is_zero() {
            continue;
        }
        pos.x += vel.vx * delta;
        pos.y += vel.vy * delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_once(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        schedule.run(world);
    }

    #[test]
    fn test_movement_applies_velocity() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));

        let entity = world
            .spawn((Position::new(10.0, 20.0), Velocity::new(50.0, -30.0)))
            .id();
        run_once(&mut world);

        let pos = world.get::<Position>(entity).unwrap();
        assert!((pos.x - 15.0).abs() < 0.001);
        assert!((pos.y - 17.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_velocity_is_noop() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));

        let entity = world
            .spawn((Position::new(3.0, 4.0), Velocity::zero()))
            .id();
        run_once(&mut world);

        assert_eq!(*world.get::<Position>(entity).unwrap(), Position::new(3.0, 4.0));
    }

    #[test]
    fn test_movement_is_exact_across_deltas() {
        for step in 0..=10 {
            let d = step as f32 * 0.01;
            let mut world = World::new();
            world.insert_resource(DeltaTime(d));
            let entity = world
                .spawn((Position::new(1.0, 1.0), Velocity::new(7.0, -3.0)))
                .id();
            run_once(&mut world);

            let pos = world.get::<Position>(entity).unwrap();
            assert!((pos.x - (1.0 + 7.0 * d)).abs() < 1e-5);
            assert!((pos.y - (1.0 - 3.0 * d)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_delta_is_clamped() {
        assert_eq!(DeltaTime::clamped(0.5).0, MAX_FRAME_DELTA);
        assert_eq!(DeltaTime::clamped(-1.0).0, 0.0);
        assert_eq!(DeltaTime::clamped(f32::NAN).0, 0.0);
        assert_eq!(DeltaTime::clamped(0.016).0, 0.016);
    }
}
