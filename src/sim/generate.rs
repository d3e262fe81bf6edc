//! Procedural row generation
//!
//! Each row is classified as a car lane or a forest by a single uniform draw
//! against the difficulty's car-row probability, then populated:
//! - Forest: 3-5 trees on distinct tiles (rejection sampling)
//! - Car lane: direction, speed and vehicle count from the difficulty ranges,
//!   vehicles spaced by a capped-retry search (best effort, never loops forever)

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::row::{Row, Tree, TreeHeight, Vehicle};
use crate::consts::*;
use crate::difficulty::DifficultyProfile;

/// Vehicle color tags, resolved to actual colors by the renderer's theme
pub const VEHICLE_COLORS: [&str; 6] = ["olive", "sand", "slate", "crimson", "forest", "steel"];

/// Wrap any integer onto the lateral tile range
#[inline]
pub fn wrap_tile(tile: i32) -> i32 {
    MIN_TILE_INDEX + (tile - MIN_TILE_INDEX).rem_euclid(TILES_PER_ROW)
}

/// Row generator. Holds only its RNG; difficulty is passed per call.
#[derive(Debug, Clone)]
pub struct RowGenerator {
    rng: Pcg32,
}

impl RowGenerator {
    /// Reproducible generator (tests, replays)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg32::from_rng(&mut rand::rng()),
        }
    }

    /// Generate `count` rows using `profile`
    pub fn generate(&mut self, count: usize, profile: &DifficultyProfile) -> Vec<Row> {
        (0..count).map(|_| self.next_row(profile)).collect()
    }

    fn next_row(&mut self, profile: &DifficultyProfile) -> Row {
        let roll: f64 = self.rng.random();
        if roll < profile.car_row_probability {
            self.car_lane(profile)
        } else {
            self.forest()
        }
    }

    fn forest(&mut self) -> Row {
        let count = self
            .rng
            .random_range(MIN_TREES_PER_ROW..=MAX_TREES_PER_ROW);
        let mut trees: Vec<Tree> = Vec::with_capacity(count);

        while trees.len() < count {
            let tile_index = self.rng.random_range(MIN_TILE_INDEX..=MAX_TILE_INDEX);
            if trees.iter().any(|t| t.tile_index == tile_index) {
                continue;
            }
            let height = TreeHeight::ALL[self.rng.random_range(0..TreeHeight::ALL.len())];
            trees.push(Tree { tile_index, height });
        }

        Row::Forest { trees }
    }

    fn car_lane(&mut self, profile: &DifficultyProfile) -> Row {
        let direction = self.rng.random_bool(0.5);
        let speed = self
            .rng
            .random_range(profile.min_speed..=profile.max_speed) as f32;
        let count = self
            .rng
            .random_range(profile.min_vehicles..=profile.max_vehicles);

        let vehicles = self
            .vehicle_positions(count, profile.min_safe_spacing)
            .into_iter()
            .map(|initial_tile_index| Vehicle {
                initial_tile_index,
                color_tag: VEHICLE_COLORS[self.rng.random_range(0..VEHICLE_COLORS.len())]
                    .to_string(),
            })
            .collect();

        Row::Car {
            direction,
            speed,
            vehicles,
        }
    }

    /// Spawn tiles for `count` vehicles. Each vehicle after the first is placed
    /// a random gap after the previous one; a candidate closer than
    /// `min_spacing` to any placed vehicle is redrawn, up to
    /// `MAX_PLACEMENT_ATTEMPTS` more times, after which the last candidate stands.
    fn vehicle_positions(&mut self, count: u32, min_spacing: i32) -> Vec<i32> {
        let mut positions = Vec::with_capacity(count as usize);
        if count == 0 {
            return positions;
        }

        let max_spacing = (TILES_PER_ROW / 2).max(min_spacing);
        let mut last = self.rng.random_range(MIN_TILE_INDEX..=MAX_TILE_INDEX);
        positions.push(last);

        for _ in 1..count {
            let (candidate, clear) = place_with_retries(
                MAX_PLACEMENT_ATTEMPTS,
                || wrap_tile(last + self.rng.random_range(min_spacing..=max_spacing)),
                |candidate| {
                    positions
                        .iter()
                        .all(|p: &i32| (p - candidate).abs() >= min_spacing)
                },
            );
            if !clear {
                log::trace!(
                    "Vehicle spacing unmet after {} retries, placing at {}",
                    MAX_PLACEMENT_ATTEMPTS,
                    candidate
                );
            }
            positions.push(candidate);
            last = candidate;
        }

        positions
    }
}

/// Draw a candidate and redraw up to `max_retries` times until `accept` holds.
/// Returns the accepted candidate, or the last one drawn with `false`.
fn place_with_retries(
    max_retries: u32,
    mut draw: impl FnMut() -> i32,
    accept: impl Fn(i32) -> bool,
) -> (i32, bool) {
    let mut candidate = draw();
    for _ in 0..max_retries {
        if accept(candidate) {
            return (candidate, true);
        }
        candidate = draw();
    }
    let clear = accept(candidate);
    (candidate, clear)
}

impl Default for RowGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyLevel;
    use crate::tile_in_range;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_tile() {
        assert_eq!(wrap_tile(0), 0);
        assert_eq!(wrap_tile(MAX_TILE_INDEX + 1), MIN_TILE_INDEX);
        assert_eq!(wrap_tile(MIN_TILE_INDEX - 1), MAX_TILE_INDEX);
        assert_eq!(wrap_tile(6 + 5), -6);
    }

    #[test]
    fn test_placement_retry_budget() {
        let mut draws = 0;
        let (candidate, clear) = place_with_retries(
            MAX_PLACEMENT_ATTEMPTS,
            || {
                draws += 1;
                draws
            },
            |_| false,
        );
        // First draw plus the full retry budget
        assert_eq!(draws, MAX_PLACEMENT_ATTEMPTS as i32 + 1);
        assert_eq!(candidate, draws);
        assert!(!clear);

        let mut draws = 0;
        let (candidate, clear) = place_with_retries(
            MAX_PLACEMENT_ATTEMPTS,
            || {
                draws += 1;
                draws
            },
            |c| c == 3,
        );
        assert_eq!((candidate, clear), (3, true));
        assert_eq!(draws, 3);
    }

    #[test]
    fn test_generate_zero_rows() {
        let mut generator = RowGenerator::new(1);
        assert!(generator.generate(0, &DifficultyLevel::Hard.profile()).is_empty());
    }

    #[test]
    fn test_car_lane_parameters_follow_profile() {
        for level in DifficultyLevel::ALL {
            let profile = level.profile();
            let mut generator = RowGenerator::new(42);

            for row in generator.generate(500, &profile) {
                if let Row::Car {
                    speed, vehicles, ..
                } = row
                {
                    assert!(speed >= profile.min_speed as f32 && speed <= profile.max_speed as f32);
                    let n = vehicles.len() as u32;
                    assert!(n >= profile.min_vehicles && n <= profile.max_vehicles);
                    for v in &vehicles {
                        assert!(tile_in_range(v.initial_tile_index));
                        assert!(VEHICLE_COLORS.contains(&v.color_tag.as_str()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_car_row_ratio_tracks_probability() {
        for level in DifficultyLevel::ALL {
            let profile = level.profile();
            let mut generator = RowGenerator::new(7);
            let rows = generator.generate(4000, &profile);
            let cars = rows.iter().filter(|r| r.is_car_lane()).count();
            let ratio = cars as f64 / rows.len() as f64;
            assert!(
                (ratio - profile.car_row_probability).abs() < 0.05,
                "{:?}: ratio {} vs {}",
                level,
                ratio,
                profile.car_row_probability
            );
        }
    }

    #[test]
    fn test_spacing_usually_met() {
        // Best effort: with the retry cap the easy preset still almost always
        // keeps its 5-tile gap between its (at most two) vehicles
        let profile = DifficultyLevel::Easy.profile();
        let mut generator = RowGenerator::new(3);
        let mut lanes = 0;
        let mut spaced = 0;
        for row in generator.generate(2000, &profile) {
            if let Row::Car { vehicles, .. } = row {
                lanes += 1;
                let ok = vehicles.iter().enumerate().all(|(i, a)| {
                    vehicles[i + 1..].iter().all(|b| {
                        (a.initial_tile_index - b.initial_tile_index).abs() >= profile.min_safe_spacing
                    })
                });
                if ok {
                    spaced += 1;
                }
            }
        }
        assert!(lanes > 0);
        assert!(spaced as f64 / lanes as f64 > 0.95);
    }

    #[test]
    fn test_same_seed_same_rows() {
        let profile = DifficultyLevel::Medium.profile();
        let a = RowGenerator::new(99).generate(50, &profile);
        let b = RowGenerator::new(99).generate(50, &profile);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_generate_exact_count_distinct_trees(
            seed in any::<u64>(),
            level in 0usize..3,
            count in 0usize..64,
        ) {
            let profile = DifficultyLevel::ALL[level].profile();
            let rows = RowGenerator::new(seed).generate(count, &profile);
            prop_assert_eq!(rows.len(), count);

            for row in &rows {
                if let Row::Forest { trees } = row {
                    prop_assert!(trees.len() >= MIN_TREES_PER_ROW && trees.len() <= MAX_TREES_PER_ROW);
                    for (i, a) in trees.iter().enumerate() {
                        prop_assert!(tile_in_range(a.tile_index));
                        for b in &trees[i + 1..] {
                            prop_assert_ne!(a.tile_index, b.tile_index);
                        }
                    }
                }
            }
        }
    }
}
