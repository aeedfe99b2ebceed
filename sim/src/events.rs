//! Outbound event stream.
//!
//! Systems append to [`EventQueue`] during a frame. After the whole pipeline
//! has run, `SimWorld` drains the queue in FIFO order and hands each event to
//! every subscribed [`EventListener`]. Listeners never push events back.

use crate::components::{MonsterType, Position};
use bevy_ecs::prelude::*;
use serde::{Serialize, Serializer};

fn entity_bits<S: Serializer>(entity: &Entity, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(entity.to_bits())
}

/// Something observable that happened during a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimEvent {
    MonsterSpawned {
        #[serde(serialize_with = "entity_bits")]
        entity: Entity,
        position: Position,
        kind: MonsterType,
        level: u32,
        is_player: bool,
    },
    MonsterDamaged {
        #[serde(serialize_with = "entity_bits")]
        entity: Entity,
        #[serde(serialize_with = "entity_bits")]
        attacker: Entity,
        damage: f32,
        position: Position,
    },
    MonstersMerged {
        #[serde(serialize_with = "entity_bits")]
        first: Entity,
        #[serde(serialize_with = "entity_bits")]
        second: Entity,
        #[serde(serialize_with = "entity_bits")]
        result: Entity,
        kind: MonsterType,
        level: u32,
        position: Position,
    },
    MonsterDied {
        #[serde(serialize_with = "entity_bits")]
        entity: Entity,
        position: Position,
        was_player: bool,
    },
}

impl SimEvent {
    /// Wire name of the event kind.
    pub fn name(&self) -> &'static str {
        match self {
            SimEvent::MonsterSpawned { .. } => "MONSTER_SPAWNED",
            SimEvent::MonsterDamaged { .. } => "MONSTER_DAMAGED",
            SimEvent::MonstersMerged { .. } => "MONSTERS_MERGED",
            SimEvent::MonsterDied { .. } => "MONSTER_DIED",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Serialize a frame's events as one JSON array, oldest first.
pub fn events_to_json(events: &[SimEvent]) -> Result<String, serde_json::Error> {
    serde_json::to_string(events)
}

/// Per-frame append-only event buffer.
#[derive(Resource, Debug, Default)]
pub struct EventQueue {
    events: Vec<SimEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Observer of the event stream (renderer, UI, audio, tests).
pub trait EventListener {
    fn on_event(&mut self, event: &SimEvent) -> anyhow::Result<()>;
}

impl<F> EventListener for F
where
    F: FnMut(&SimEvent) -> anyhow::Result<()>,
{
    fn on_event(&mut self, event: &SimEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// Deliver `events` to every listener in order.
///
/// A failing listener is logged and skipped for that event; the others still
/// see it. Returns the number of failed deliveries.
pub fn dispatch_events(listeners: &mut [Box<dyn EventListener>], events: &[SimEvent]) -> usize {
    let mut failures = 0;
    for event in events {
        for (index, listener) in listeners.iter_mut().enumerate() {
            if let Err(err) = listener.on_event(event) {
                failures += 1;
                tracing::warn!(listener = index, event = event.name(), error = %err, "event listener failed");
            }
        }
    }
    failures
}
