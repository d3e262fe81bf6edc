//! Deterministic simulation module
//!
//! All gameplay rules live here:
//! - Seeded RNG only (level generation)
//! - Obstacle motion is a pure function of elapsed time
//! - No rendering or platform dependencies

pub mod collision;
pub mod generate;
pub mod level;
pub mod moves;
pub mod player;
pub mod row;
pub mod score;

pub use collision::{
    Aabb, CollisionDetector, Hit, HitKind, lane_bounds, vehicle_hits_player, vehicle_world_x,
};
pub use generate::{RowGenerator, VEHICLE_COLORS};
pub use level::LevelBuffer;
pub use moves::{GridPosition, MoveDirection, final_position, is_valid};
pub use player::{MoveResult, Player, StepOutcome};
pub use row::{Row, Tree, TreeHeight, Vehicle};
pub use score::Score;
