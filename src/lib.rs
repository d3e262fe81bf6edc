//! Pixel Tanks - endless lane-crossing simulation core
//!
//! Core modules:
//! - `sim`: Level generation, player movement, scoring and collision detection
//! - `difficulty`: Difficulty presets and the persisted difficulty store
//! - `leaderboard`: Persisted top-N score ledger
//! - `game`: Composition root wiring every component together
//! - `platform`: Clock, date formatting and key-value storage backends
//! - `observer`: Synchronous change-notification lists

pub mod difficulty;
pub mod game;
pub mod leaderboard;
pub mod observer;
pub mod platform;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use difficulty::{DifficultyLevel, DifficultyProfile, DifficultyStore};
pub use game::{Game, GameEvent, GamePhase};
pub use leaderboard::{Admission, Leaderboard, LeaderboardEntry};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Lateral tile range (inclusive)
    pub const MIN_TILE_INDEX: i32 = -8;
    pub const MAX_TILE_INDEX: i32 = 8;
    /// Tiles per row
    pub const TILES_PER_ROW: i32 = MAX_TILE_INDEX - MIN_TILE_INDEX + 1;
    /// World units per tile (both axes)
    pub const TILE_SIZE: f32 = 42.0;

    /// Rows that must exist beyond the player's row before more are generated
    pub const LOOKAHEAD_ROWS: usize = 10;
    /// Rows appended per generation batch
    pub const ROW_BATCH_SIZE: usize = 20;

    /// Trees per forest row (inclusive)
    pub const MIN_TREES_PER_ROW: usize = 3;
    pub const MAX_TREES_PER_ROW: usize = 5;
    /// Spacing redraws after the first candidate before a vehicle placement
    /// is accepted as-is
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 10;

    /// Hitboxes (world units)
    pub const PLAYER_SIZE: f32 = 15.0;
    pub const VEHICLE_LENGTH: f32 = 60.0;
    pub const VEHICLE_WIDTH: f32 = 30.0;
    pub const TREE_FOOTPRINT: f32 = 30.0;

    /// Vehicles wrap this many tiles past either edge of the lane
    pub const LANE_OVERHANG_TILES: i32 = 2;

    /// Forward progress emits a milestone every N rows
    pub const MILESTONE_INTERVAL: u32 = 10;
}

/// World-space center of a grid cell
#[inline]
pub fn grid_to_world(row: i32, tile: i32) -> Vec2 {
    Vec2::new(tile as f32 * consts::TILE_SIZE, row as f32 * consts::TILE_SIZE)
}

/// Whether a lateral index lies inside the playable range
#[inline]
pub fn tile_in_range(tile: i32) -> bool {
    (consts::MIN_TILE_INDEX..=consts::MAX_TILE_INDEX).contains(&tile)
}
