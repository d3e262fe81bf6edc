//! Row data model
//!
//! A row is created once by the generator and never mutated. Car lanes store
//! only the spawn layout; live vehicle positions are a function of elapsed
//! time (see `collision::vehicle_world_x`).

use serde::{Deserialize, Serialize};

/// Tree size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeHeight {
    Small,
    Medium,
    Large,
}

impl TreeHeight {
    pub const ALL: [TreeHeight; 3] = [TreeHeight::Small, TreeHeight::Medium, TreeHeight::Large];

    /// Foliage height in world units
    pub fn units(&self) -> f32 {
        match self {
            TreeHeight::Small => 20.0,
            TreeHeight::Medium => 30.0,
            TreeHeight::Large => 50.0,
        }
    }
}

/// A static obstacle in a forest row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub tile_index: i32,
    pub height: TreeHeight,
}

/// A vehicle's spawn layout in a car lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub initial_tile_index: i32,
    pub color_tag: String,
}

/// One lateral slice of the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Row {
    /// Safe row, trees block individual tiles
    Forest { trees: Vec<Tree> },
    /// Hazard lane. `direction == true` travels toward +x.
    Car {
        direction: bool,
        speed: f32,
        vehicles: Vec<Vehicle>,
    },
}

impl Row {
    /// The obstacle-free spawn row
    pub fn empty() -> Self {
        Row::Forest { trees: Vec::new() }
    }

    pub fn is_car_lane(&self) -> bool {
        matches!(self, Row::Car { .. })
    }

    /// Whether a tree occupies `tile`
    pub fn has_tree_at(&self, tile: i32) -> bool {
        match self {
            Row::Forest { trees } => trees.iter().any(|t| t.tile_index == tile),
            Row::Car { .. } => false,
        }
    }
}
