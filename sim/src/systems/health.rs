//! Health system - removes dead entities.

use crate::components::*;
use crate::events::{EventQueue, SimEvent};
use crate::resources::{DeadEntities, PlayerEntities};
use bevy_ecs::prelude::*;
use tracing::debug;

/// System that despawns every entity whose health has reached zero.
///
/// Dead entities are queued in ascending entity order, then drained: each is
/// despawned, dropped from the player list and reported as `MonsterDied`.
/// Running it again without new damage changes nothing.
pub fn health_system(
    mut commands: Commands,
    mut dead: ResMut<DeadEntities>,
    mut players: ResMut<PlayerEntities>,
    mut events: ResMut<EventQueue>,
    query: Query<(Entity, &Health, Option<&Position>)>,
) {
    dead.0.extend(
        query
            .iter()
            .filter(|(_, health, _)| health.is_dead())
            .map(|(entity, _, _)| entity),
    );
    dead.0.sort();

    for entity in dead.0.drain(..) {
        let position = query
            .get(entity)
            .ok()
            .and_then(|(_, _, pos)| pos.copied())
            .unwrap_or_default();
        let was_player = players.remove(entity);
        commands.entity(entity).despawn();
        debug!(?entity, was_player, "monster died");
        events.push(SimEvent::MonsterDied {
            entity,
            position,
            was_player,
        });
    }
}
