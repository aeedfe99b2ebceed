//! Knockback system - decaying displacement left by strikes.

use crate::components::*;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;

/// Per-frame multiplicative decay of knockback force.
pub const KNOCKBACK_DECAY: f32 = 0.9;

/// System that pushes struck entities along their knockback direction.
///
/// Displacement goes straight into `Position`; velocity is untouched. Decay is
/// per frame rather than per second, like the rest of the delta-scaled
/// pipeline. An expired component stays attached but does nothing until a
/// new strike re-arms it.
pub fn knockback_system(dt: Res<DeltaTime>, mut query: Query<(&mut Position, &mut Knockback)>) {
    let delta = dt.0;
    for (mut pos, mut knockback) in query.iter_mut() {
        if !knockback.is_active() {
            continue;
        }
        knockback.remaining -= delta;
        if !knockback.is_active() {
            continue;
        }
        let (sin, cos) = knockback.direction.sin_cos();
        pos.x += cos * knockback.force * delta;
        pos.y += sin * knockback.force * delta;
        knockback.force *= KNOCKBACK_DECAY;
    }
}
