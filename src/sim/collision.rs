//! Collision detection against moving vehicles and static trees
//!
//! Vehicle position is a continuous function of elapsed time, so a hit can
//! land between two logical player steps. The detector reads one committed
//! player cell per check and compares axis-aligned boxes in world space.
//!
//! Lane geometry: vehicles travel between `LANE_OVERHANG_TILES` tiles past
//! either edge of the playable range and re-enter from the opposite end.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::LevelBuffer;
use super::moves::GridPosition;
use super::row::Row;
use crate::consts::*;
use crate::grid_to_world;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_extents: size / 2.0,
        }
    }

    /// Strict overlap: touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let gap = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        gap.x < reach.x && gap.y < reach.y
    }
}

/// What the player ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    /// Vehicle at this index in the row's vehicle list
    Vehicle { index: usize },
    Tree,
}

/// A detected overlap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub kind: HitKind,
    /// Row of the obstacle
    pub row: i32,
    /// Player cell at the time of the check
    pub player: GridPosition,
    /// World x of the obstacle's center
    pub obstacle_x: f32,
}

/// World x range vehicles travel across, `[begin, end)`
#[inline]
pub fn lane_bounds() -> (f32, f32) {
    let begin = (MIN_TILE_INDEX - LANE_OVERHANG_TILES) as f32 * TILE_SIZE;
    let end = (MAX_TILE_INDEX + LANE_OVERHANG_TILES) as f32 * TILE_SIZE;
    (begin, end)
}

/// World x of a vehicle after `elapsed_secs` of travel
pub fn vehicle_world_x(
    initial_tile_index: i32,
    speed: f32,
    direction: bool,
    elapsed_secs: f64,
) -> f32 {
    let (begin, end) = lane_bounds();
    let (begin, span) = (f64::from(begin), f64::from(end - begin));
    let start = f64::from(initial_tile_index) * f64::from(TILE_SIZE);
    let sign = if direction { 1.0 } else { -1.0 };
    let travelled = sign * f64::from(speed) * elapsed_secs;
    (begin + (start - begin + travelled).rem_euclid(span)) as f32
}

pub fn player_box(position: GridPosition) -> Aabb {
    Aabb::new(
        grid_to_world(position.row, position.tile),
        Vec2::splat(PLAYER_SIZE),
    )
}

pub fn vehicle_box(row: i32, x: f32) -> Aabb {
    Aabb::new(
        Vec2::new(x, row as f32 * TILE_SIZE),
        Vec2::new(VEHICLE_LENGTH, VEHICLE_WIDTH),
    )
}

pub fn tree_box(row: i32, tile: i32) -> Aabb {
    Aabb::new(grid_to_world(row, tile), Vec2::splat(TREE_FOOTPRINT))
}

/// Overlap test for one vehicle. Pure: same inputs, same answer.
pub fn vehicle_hits_player(
    row: i32,
    initial_tile_index: i32,
    speed: f32,
    direction: bool,
    elapsed_secs: f64,
    player: GridPosition,
) -> bool {
    let x = vehicle_world_x(initial_tile_index, speed, direction, elapsed_secs);
    vehicle_box(row, x).overlaps(&player_box(player))
}

/// First obstacle in `row` overlapping the player, if any
pub fn row_hit(row_index: i32, row: &Row, player: GridPosition, elapsed_secs: f64) -> Option<Hit> {
    let target = player_box(player);
    match row {
        Row::Car {
            direction,
            speed,
            vehicles,
        } => vehicles.iter().enumerate().find_map(|(index, vehicle)| {
            let x = vehicle_world_x(vehicle.initial_tile_index, *speed, *direction, elapsed_secs);
            vehicle_box(row_index, x).overlaps(&target).then_some(Hit {
                kind: HitKind::Vehicle { index },
                row: row_index,
                player,
                obstacle_x: x,
            })
        }),
        Row::Forest { trees } => trees.iter().find_map(|tree| {
            tree_box(row_index, tree.tile_index)
                .overlaps(&target)
                .then(|| Hit {
                    kind: HitKind::Tree,
                    row: row_index,
                    player,
                    obstacle_x: tree.tile_index as f32 * TILE_SIZE,
                })
        }),
    }
}

/// Per-frame collision check. Stateless: it reports every frame the overlap
/// persists; debouncing belongs to whoever consumes the hit.
#[derive(Debug, Clone)]
pub struct CollisionDetector {
    /// Rows sampled on each side of the player's row
    window: i32,
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self { window: 1 }
    }
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the player's committed cell against every live obstacle near it
    pub fn check_collisions(
        &self,
        player: GridPosition,
        level: &LevelBuffer,
        elapsed_secs: f64,
    ) -> Option<Hit> {
        (player.row - self.window..=player.row + self.window).find_map(|index| {
            level
                .get(index)
                .and_then(|row| row_hit(index, row, player, elapsed_secs))
        })
    }
}
