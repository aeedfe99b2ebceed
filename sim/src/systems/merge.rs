//! Merge system - fuses overlapping monsters of the same kind.
//!
//! Candidates are player monsters carrying `Monster`,
//! `Mergeable { can_merge: true }` and the `Overlap` tag set by collision this
//! frame. They are paired in ascending entity order, first match wins, and
//! each entity joins at most one merge per frame. The result is always a
//! player monster.

use crate::components::*;
use crate::config::SimConfig;
use crate::events::{EventQueue, SimEvent};
use crate::resources::{EntitiesToRemove, PlayerEntities};
use crate::spatial::sort_by_entity;
use bevy_ecs::prelude::*;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    monster: Monster,
    position: Position,
    radius: f32,
}

/// Level of the monster produced by merging `a` and `b`.
pub fn merged_level(a: u32, b: u32, max_level: u32) -> u32 {
    (a.max(b) + 1).min(max_level)
}

/// System that merges overlapping same-kind monsters into a stronger one.
///
/// ## Data Access
/// - Reads: SimConfig, Monster, Mergeable, Position, Collider
/// - Writes: PlayerEntities, EntitiesToRemove, EventQueue, spawns/despawns (deferred)
pub fn merge_system(
    config: Res<SimConfig>,
    mut commands: Commands,
    mut players: ResMut<PlayerEntities>,
    mut to_remove: ResMut<EntitiesToRemove>,
    mut events: ResMut<EventQueue>,
    query: Query<
        (Entity, &Monster, &Mergeable, &Position, &Collider),
        (With<Overlap>, With<PlayerControlled>),
    >,
) {
    let mut candidates: Vec<(Entity, Candidate)> = query
        .iter()
        .filter(|(_, _, mergeable, _, _)| mergeable.can_merge)
        .map(|(entity, monster, _, position, collider)| {
            (
                entity,
                Candidate {
                    monster: *monster,
                    position: *position,
                    radius: collider.radius,
                },
            )
        })
        .collect();
    sort_by_entity(&mut candidates);

    let mut consumed = vec![false; candidates.len()];
    for i in 0..candidates.len() {
        if consumed[i] {
            continue;
        }
        let (first, a) = candidates[i];
        let partner = (i + 1..candidates.len()).find(|&j| {
            let b = &candidates[j].1;
            !consumed[j]
                && a.monster.kind == b.monster.kind
                && a.position.distance_to(&b.position) < a.radius + b.radius
        });
        let Some(j) = partner else {
            continue;
        };
        let (second, b) = candidates[j];
        consumed[i] = true;
        consumed[j] = true;

        let kind = a.monster.kind;
        let level = merged_level(a.monster.level, b.monster.level, config.max_level);
        let position = a.position.midpoint(&b.position);

        to_remove.0.push(first);
        to_remove.0.push(second);

        let result = commands.spawn(PlayerMonsterBundle::new(kind, level, position)).id();

        players.remove(first);
        players.remove(second);
        players.push(result);

        debug!(?first, ?second, ?result, level, kind = kind.as_str(), "monsters merged");
        events.push(SimEvent::MonstersMerged {
            first,
            second,
            result,
            kind,
            level,
            position,
        });
    }

    for entity in to_remove.0.drain(..) {
        commands.entity(entity).despawn();
    }
}
