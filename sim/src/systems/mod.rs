//! ECS systems for the Monster Merge Arena simulation.
//!
//! Systems contain the game logic that operates on components.
//!
//! ## Frame Pipeline
//!
//! One frame runs every system exactly once, strictly in this order:
//!
//! 1. `movement_system` - applies velocity to position
//! 2. `ai_system` - enemy targeting and steering
//! 3. `attack_system` - cooldowns, strikes, knockback impulses
//! 4. `knockback_system` - decaying displacement
//! 5. `collision_system` - arena bounds, overlap tagging, separation
//! 6. `health_system` - removes the dead
//! 7. `merge_system` - fuses overlapping same-kind monsters
//! 8. `spawn_system` - timed enemy spawns at the edges
//!
//! The systems are chained, so deferred commands from one system (inserts,
//! removals, spawns, despawns) are applied before the next one runs.

pub mod ai;
pub mod collision;
pub mod combat;
pub mod health;
pub mod knockback;
pub mod merge;
pub mod movement;
pub mod spawn;

pub use ai::*;
pub use collision::*;
pub use combat::*;
pub use health::*;
pub use knockback::*;
pub use merge::*;
pub use movement::*;
pub use spawn::*;

use bevy_ecs::prelude::*;

/// Build the schedule that runs one frame of the pipeline.
pub fn build_frame_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            movement_system,
            ai_system,
            attack_system,
            knockback_system,
            collision_system,
            health_system,
            merge_system,
            spawn_system,
        )
            .chain(),
    );
    schedule
}
