//! Grid moves and the validity checker
//!
//! A move sequence is valid when it can physically exist on the grid: the
//! lateral index stays inside `[MIN_TILE_INDEX, MAX_TILE_INDEX]` at every
//! step and the row never drops below the spawn row. Obstacles are not
//! consulted here; running into a tree or vehicle is the collision
//! detector's business.

use serde::{Deserialize, Serialize};

use crate::tile_in_range;

/// Discrete player move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::Left,
        MoveDirection::Right,
    ];

    /// (row delta, tile delta)
    pub fn delta(&self) -> (i32, i32) {
        match self {
            MoveDirection::Forward => (1, 0),
            MoveDirection::Backward => (-1, 0),
            MoveDirection::Left => (0, -1),
            MoveDirection::Right => (0, 1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Forward => "forward",
            MoveDirection::Backward => "backward",
            MoveDirection::Left => "left",
            MoveDirection::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "forward" | "up" => Some(MoveDirection::Forward),
            "backward" | "down" => Some(MoveDirection::Backward),
            "left" => Some(MoveDirection::Left),
            "right" => Some(MoveDirection::Right),
            _ => None,
        }
    }
}

/// A grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: i32,
    pub tile: i32,
}

impl GridPosition {
    pub fn new(row: i32, tile: i32) -> Self {
        Self { row, tile }
    }

    /// Cell reached by applying one move
    pub fn step(self, direction: MoveDirection) -> Self {
        let (dr, dt) = direction.delta();
        Self {
            row: self.row + dr,
            tile: self.tile + dt,
        }
    }
}

/// Apply `moves` in order from `start`. Returns the final cell, or `None` if
/// any intermediate or final cell leaves the grid.
pub fn final_position(
    start: GridPosition,
    moves: impl IntoIterator<Item = MoveDirection>,
) -> Option<GridPosition> {
    moves.into_iter().try_fold(start, |pos, direction| {
        let next = pos.step(direction);
        (next.row >= 0 && tile_in_range(next.tile)).then_some(next)
    })
}

/// Whether `moves` applied from `start` stays on the grid throughout
pub fn is_valid(start: GridPosition, moves: impl IntoIterator<Item = MoveDirection>) -> bool {
    final_position(start, moves).is_some()
}
