//! Collision system - arena bounds and circle overlap.
//!
//! ## Phases
//!
//! 1. **Clamp** - every collider is kept inside the arena, inset by its radius.
//! 2. **Gather** - the spatial grid is rebuilt and overlapping pairs
//!    `(a, b)` with `a < b` are collected. This phase is read-only and runs on
//!    rayon with `--features parallel`. Pairs are sorted afterwards, so the
//!    result does not depend on thread scheduling.
//! 3. **Resolve** - overlapping pairs are tagged. Solid pairs that are not
//!    merge partners are pushed apart by the minimum translation.
//! 4. **Tag** - `Overlap` is inserted or removed so it reflects this frame only.

use crate::components::*;
use crate::config::SimConfig;
use crate::spatial::{sort_by_entity, SpatialGrid};
use bevy_ecs::prelude::*;
use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Below this centre distance two circles are treated as coincident.
const COINCIDENT_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy)]
struct Body {
    entity: Entity,
    x: f32,
    y: f32,
    radius: f32,
    is_trigger: bool,
    /// Kind, when the body is a monster that may merge.
    merge_kind: Option<MonsterType>,
}

impl Body {
    /// Merge partners are left interpenetrating so the merge system can fuse them.
    fn blocks(&self, other: &Body) -> bool {
        if self.is_trigger || other.is_trigger {
            return false;
        }
        !(self.merge_kind.is_some() && self.merge_kind == other.merge_kind)
    }
}

/// Clamp one coordinate into `[radius, extent - radius]`, or centre it when
/// the arena is narrower than the collider.
pub fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    if extent < radius * 2.0 {
        extent * 0.5
    } else {
        value.clamp(radius, extent - radius)
    }
}

fn gather_pairs(bodies: &[Body], grid: &SpatialGrid, index: &HashMap<Entity, usize>) -> Vec<(usize, usize)> {
    let overlaps_of = |(i, body): (usize, &Body)| -> Vec<(usize, usize)> {
        grid.query_overlapping(body.entity, body.x, body.y, body.radius)
            .into_iter()
            .filter_map(|other| index.get(&other.entity).copied())
            .filter(|&j| j > i)
            .map(|j| (i, j))
            .collect()
    };

    #[cfg(feature = "parallel")]
    let mut pairs: Vec<(usize, usize)> = bodies.par_iter().enumerate().flat_map_iter(overlaps_of).collect();
    #[cfg(not(feature = "parallel"))]
    let mut pairs: Vec<(usize, usize)> = bodies.iter().enumerate().flat_map(overlaps_of).collect();

    pairs.sort_unstable();
    pairs
}

fn separate(a: &mut Body, b: &mut Body) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dist = (dx * dx + dy * dy).sqrt();
    let penetration = a.radius + b.radius - dist;
    if penetration <= 0.0 {
        return;
    }
    let (nx, ny) = if dist > COINCIDENT_EPSILON {
        (dx / dist, dy / dist)
    } else {
        (1.0, 0.0)
    };
    let half = penetration * 0.5;
    a.x -= nx * half;
    a.y -= ny * half;
    b.x += nx * half;
    b.y += ny * half;
}

/// System that enforces arena bounds, detects overlaps and separates solids.
///
/// ## Data Access
/// - Reads: SimConfig, Collider, Monster, Mergeable
/// - Writes: Position, SpatialGrid, Overlap (deferred insert/remove)
pub fn collision_system(
    config: Res<SimConfig>,
    mut grid: ResMut<SpatialGrid>,
    mut commands: Commands,
    mut query: Query<(
        Entity,
        &mut Position,
        &Collider,
        Option<&Monster>,
        Option<&Mergeable>,
        Has<Overlap>,
    )>,
) {
    let width = config.arena_width;
    let height = config.arena_height;

    let mut tagged: Vec<(Entity, bool)> = Vec::new();
    let mut keyed: Vec<(Entity, Body)> = Vec::new();
    for (entity, mut pos, collider, monster, mergeable, has_overlap) in query.iter_mut() {
        let r = collider.radius;
        let clamped = Position::new(clamp_axis(pos.x, r, width), clamp_axis(pos.y, r, height));
        if *pos != clamped {
            *pos = clamped;
        }
        let merge_kind = match (monster, mergeable) {
            (Some(monster), Some(m)) if m.can_merge => Some(monster.kind),
            _ => None,
        };
        keyed.push((
            entity,
            Body {
                entity,
                x: pos.x,
                y: pos.y,
                radius: r,
                is_trigger: collider.is_trigger,
                merge_kind,
            },
        ));
        tagged.push((entity, has_overlap));
    }
    sort_by_entity(&mut keyed);
    let mut bodies: Vec<Body> = keyed.into_iter().map(|(_, body)| body).collect();

    grid.clear();
    let mut index = HashMap::with_capacity(bodies.len());
    for (i, body) in bodies.iter().enumerate() {
        grid.insert(body.entity, body.x, body.y, body.radius);
        index.insert(body.entity, i);
    }

    let pairs = gather_pairs(&bodies, &grid, &index);

    let mut overlapping = vec![false; bodies.len()];
    for &(i, j) in &pairs {
        overlapping[i] = true;
        overlapping[j] = true;
        if bodies[i].blocks(&bodies[j]) {
            let (left, right) = bodies.split_at_mut(j);
            separate(&mut left[i], &mut right[0]);
        }
    }

    for body in &bodies {
        if let Ok((_, mut pos, _, _, _, _)) = query.get_mut(body.entity) {
            let settled = Position::new(
                clamp_axis(body.x, body.radius, width),
                clamp_axis(body.y, body.radius, height),
            );
            if *pos != settled {
                *pos = settled;
            }
        }
    }

    for (entity, had_overlap) in tagged {
        let now = index.get(&entity).map(|&i| overlapping[i]).unwrap_or(false);
        match (had_overlap, now) {
            (false, true) => {
                commands.entity(entity).insert(Overlap);
            }
            (true, false) => {
                commands.entity(entity).remove::<Overlap>();
            }
            _ => {}
        }
    }
}
