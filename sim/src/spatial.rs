//! Spatial partitioning and stable ordering for entity queries.
//!
//! `bevy_ecs` query iteration order is an archetype/table detail. Combat and
//! merge tie-breaks are observable, so every system that picks "the first"
//! of something sorts by [`Entity`] first. The grid gives the collision pass
//! O(k) candidate lookups instead of an O(n²) scan.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Sort query results ascending by entity so first-match rules are stable.
pub fn sort_by_entity<T>(items: &mut [(Entity, T)]) {
    items.sort_by_key(|(entity, _)| *entity);
}

/// Grid-based spatial partitioning structure.
///
/// Divides the arena into square cells and tracks which colliders sit in each.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    /// Largest radius inserted since the last clear.
    max_radius: f32,
    count: usize,
}

/// Entry in a spatial cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(64.0)
    }
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            max_radius: 0.0,
            count: 0,
        }
    }

    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Clear all entries (call before rebuilding).
    pub fn clear(&mut self) {
        self.cells.clear();
        self.max_radius = 0.0;
        self.count = 0;
    }

    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, radius: f32) {
        let cell = self.world_to_cell(x, y);
        self.cells.entry(cell).or_default().push(SpatialEntry {
            entity,
            x,
            y,
            radius,
        });
        self.max_radius = self.max_radius.max(radius);
        self.count += 1;
    }

    /// Entries whose centres lie within `radius` of `(x, y)`.
    /// Sorted by distance, ties by entity.
    ///
    /// Visits whichever is smaller: the cell window around the query or the
    /// occupied cells, so a huge radius never scans empty space.
    pub fn query_radius(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let radius_sq = radius * radius;
        let reach = i64::from((radius / self.cell_size).ceil().min(i32::MAX as f32) as i32) + 1;
        let (cx, cy) = self.world_to_cell(x, y);
        let in_window = |(col, row): (i32, i32)| {
            (i64::from(col) - i64::from(cx)).abs() <= reach && (i64::from(row) - i64::from(cy)).abs() <= reach
        };
        let within = |entry: &&SpatialEntry| (entry.x - x).powi(2) + (entry.y - y).powi(2) <= radius_sq;

        let side = 2 * reach + 1;
        let mut results: Vec<SpatialEntry> = if side.saturating_mul(side) > self.cells.len() as i64 {
            self.cells
                .iter()
                .filter(|(cell, _)| in_window(**cell))
                .flat_map(|(_, entries)| entries.iter().filter(within).copied())
                .collect()
        } else {
            let mut found = Vec::new();
            for dx in -reach..=reach {
                for dy in -reach..=reach {
                    let cell = ((i64::from(cx) + dx) as i32, (i64::from(cy) + dy) as i32);
                    if let Some(entries) = self.cells.get(&cell) {
                        found.extend(entries.iter().filter(within).copied());
                    }
                }
            }
            found
        };

        results.sort_by(|a, b| {
            let dist_a = (a.x - x).powi(2) + (a.y - y).powi(2);
            let dist_b = (b.x - x).powi(2) + (b.y - y).powi(2);
            dist_a
                .partial_cmp(&dist_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.entity.cmp(&b.entity))
        });
        results
    }

    /// Entries whose circles strictly overlap the given circle, excluding `entity`.
    pub fn query_overlapping(&self, entity: Entity, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let mut results = self.query_radius(x, y, radius + self.max_radius);
        results.retain(|other| {
            other.entity != entity && {
                let dist = ((other.x - x).powi(2) + (other.y - y).powi(2)).sqrt();
                dist < radius + other.radius
            }
        });
        results
    }

    pub fn cell_count(&self, cell: (i32, i32)) -> usize {
        self.cells.get(&cell).map(|v| v.len()).unwrap_or(0)
    }

    pub fn total_count(&self) -> usize {
        self.count
    }
}
