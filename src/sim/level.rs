//! Level buffer
//!
//! Append-only sequence of rows indexed from 0 (the spawn row). One batch is
//! generated whenever the player comes within `LOOKAHEAD_ROWS` of the far
//! edge. The player advances one row per step, so a single batch per call
//! keeps the window filled. Growth is unbounded; nothing is ever evicted.

use super::generate::RowGenerator;
use super::row::Row;
use crate::consts::*;
use crate::difficulty::DifficultyProfile;

#[derive(Debug, Clone)]
pub struct LevelBuffer {
    rows: Vec<Row>,
    generator: RowGenerator,
    lookahead: usize,
    batch_size: usize,
}

impl LevelBuffer {
    /// Spawn row plus enough batches to cover the lookahead from row 0
    pub fn new(generator: RowGenerator, profile: &DifficultyProfile) -> Self {
        Self::with_tuning(generator, profile, LOOKAHEAD_ROWS, ROW_BATCH_SIZE)
    }

    /// Buffer with explicit lookahead/batch tuning. `batch_size` is clamped to
    /// at least 1 so `ensure_ahead` always makes progress.
    pub fn with_tuning(
        generator: RowGenerator,
        profile: &DifficultyProfile,
        lookahead: usize,
        batch_size: usize,
    ) -> Self {
        let mut level = Self {
            rows: vec![Row::empty()],
            generator,
            lookahead,
            batch_size: batch_size.max(1),
        };
        while level.rows.len() <= level.lookahead {
            level.append_batch(profile);
        }
        level
    }

    /// Append one batch if `player_row` is within the lookahead window of the
    /// end of the buffer. Returns how many rows were appended.
    pub fn ensure_ahead(&mut self, player_row: i32, profile: &DifficultyProfile) -> usize {
        if i64::from(player_row) < self.rows.len() as i64 - self.lookahead as i64 {
            return 0;
        }
        self.append_batch(profile);
        log::debug!(
            "Level extended by {} rows (player row {}, buffer {})",
            self.batch_size,
            player_row,
            self.rows.len()
        );
        self.batch_size
    }

    fn append_batch(&mut self, profile: &DifficultyProfile) {
        let batch = self.generator.generate(self.batch_size, profile);
        self.rows.extend(batch);
    }

    /// Generate rows without appending them (exposed for collaborators)
    pub fn generate(&mut self, count: usize, profile: &DifficultyProfile) -> Vec<Row> {
        self.generator.generate(count, profile)
    }

    /// Row at `index`, `None` for negative or not-yet-generated rows
    pub fn get(&self, index: i32) -> Option<&Row> {
        usize::try_from(index).ok().and_then(|i| self.rows.get(i))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyLevel;

    fn level() -> LevelBuffer {
        LevelBuffer::new(RowGenerator::new(5), &DifficultyLevel::Medium.profile())
    }

    #[test]
    fn test_new_has_safe_spawn_row() {
        let level = level();
        assert_eq!(level.len(), 1 + ROW_BATCH_SIZE);
        assert_eq!(level.get(0), Some(&Row::empty()));
        assert_eq!(level.get(-1), None);
    }

    #[test]
    fn test_ensure_ahead_threshold() {
        let profile = DifficultyLevel::Medium.profile();
        let mut level = level();
        let len = level.len() as i32;

        // Still more than LOOKAHEAD_ROWS rows ahead: nothing happens
        assert_eq!(level.ensure_ahead(len - LOOKAHEAD_ROWS as i32 - 1, &profile), 0);
        assert_eq!(level.len() as i32, len);

        // At the threshold a batch is appended
        assert_eq!(
            level.ensure_ahead(len - LOOKAHEAD_ROWS as i32, &profile),
            ROW_BATCH_SIZE
        );
        assert_eq!(level.len() as i32, len + ROW_BATCH_SIZE as i32);
    }

    #[test]
    fn test_ensure_ahead_keeps_existing_rows() {
        let profile = DifficultyLevel::Hard.profile();
        let mut level = level();
        let snapshot: Vec<Row> = level.rows().to_vec();

        for row in 0..=200 {
            level.ensure_ahead(row, &profile);
            assert!(level.len() as i32 > row + LOOKAHEAD_ROWS as i32);
        }
        assert_eq!(&level.rows()[..snapshot.len()], snapshot.as_slice());
    }

    #[test]
    fn test_far_row_appends_single_batch() {
        let profile = DifficultyLevel::Medium.profile();
        let mut level = level();
        let len = level.len();

        assert_eq!(level.ensure_ahead(i32::MAX, &profile), ROW_BATCH_SIZE);
        assert_eq!(level.len(), len + ROW_BATCH_SIZE);
    }

    #[test]
    fn test_small_batches_still_satisfy_lookahead() {
        let profile = DifficultyLevel::Easy.profile();
        let mut level = LevelBuffer::with_tuning(RowGenerator::new(1), &profile, 10, 0);
        // Batch size clamps to 1; construction fills the window from row 0
        assert_eq!(level.len(), 11);

        for row in 0..30 {
            level.ensure_ahead(row, &profile);
            assert!(level.len() as i32 > row + 10);
        }
        assert_eq!(level.len(), 40);
    }
}
