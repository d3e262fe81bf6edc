//! Player movement state machine
//!
//! `current_row`/`current_tile` are the committed position. Queued moves are
//! already validated but not yet visually resolved; the renderer drains them
//! one at a time by calling `step_completed` when each hop animation ends.
//!
//! Idle (queue empty) -> Queued (1+ moves) -> Idle as the queue drains.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::level::LevelBuffer;
use super::moves::{GridPosition, MoveDirection, is_valid};
use super::score::Score;
use crate::difficulty::DifficultyProfile;

/// Outcome of `queue_move`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Move appended to the queue
    Accepted,
    /// Move would leave the grid; nothing changed
    Rejected,
}

impl MoveResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveResult::Accepted)
    }
}

/// What a resolved step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub direction: MoveDirection,
    /// Committed position after the step
    pub position: GridPosition,
    pub row_changed: bool,
    /// Forward step reached a new maximum row
    pub new_max_row: bool,
    /// Rows the level buffer appended as a result
    pub rows_appended: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub current_row: i32,
    pub current_tile: i32,
    moves_queue: VecDeque<MoveDirection>,
    /// Wall-clock ms of the last row change
    pub last_row_change_ms: f64,
    /// One-shot request for the renderer to snap to the committed position
    #[serde(skip)]
    force_resync: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            current_row: 0,
            current_tile: 0,
            moves_queue: VecDeque::new(),
            last_row_change_ms: 0.0,
            force_resync: false,
        }
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed position snapshot
    pub fn position(&self) -> GridPosition {
        GridPosition::new(self.current_row, self.current_tile)
    }

    /// Validated moves waiting for the renderer, oldest first
    pub fn pending_moves(&self) -> impl Iterator<Item = MoveDirection> + '_ {
        self.moves_queue.iter().copied()
    }

    pub fn is_idle(&self) -> bool {
        self.moves_queue.is_empty()
    }

    /// Validate `direction` after every already-queued move and enqueue it if
    /// the whole trajectory stays on the grid
    pub fn queue_move(&mut self, direction: MoveDirection) -> MoveResult {
        let trajectory = self
            .moves_queue
            .iter()
            .copied()
            .chain(std::iter::once(direction));
        if !is_valid(self.position(), trajectory) {
            return MoveResult::Rejected;
        }
        self.moves_queue.push_back(direction);
        MoveResult::Accepted
    }

    /// Commit the oldest queued move. Forward steps feed the running score;
    /// every step tops up the level buffer. Returns `None` if nothing was queued.
    pub fn step_completed(
        &mut self,
        now_ms: f64,
        level: &mut LevelBuffer,
        score: &mut Score,
        profile: &DifficultyProfile,
    ) -> Option<StepOutcome> {
        let direction = self.moves_queue.pop_front()?;
        let previous_row = self.current_row;

        let (dr, dt) = direction.delta();
        self.current_row += dr;
        self.current_tile += dt;

        let new_max_row =
            direction == MoveDirection::Forward && score.update_max_row(self.current_row);

        let row_changed = previous_row != self.current_row;
        if row_changed {
            self.last_row_change_ms = now_ms;
        }

        let rows_appended = level.ensure_ahead(self.current_row, profile);

        Some(StepOutcome {
            direction,
            position: self.position(),
            row_changed,
            new_max_row,
            rows_appended,
        })
    }

    /// Drop pending moves, keeping the committed position
    pub fn clear_queue(&mut self) {
        self.moves_queue.clear();
    }

    /// Back to the spawn cell with an empty queue
    pub fn reset(&mut self, now_ms: f64) {
        self.current_row = 0;
        self.current_tile = 0;
        self.moves_queue.clear();
        self.last_row_change_ms = now_ms;
    }

    /// `reset` plus a request for the renderer to snap immediately
    pub fn initialize(&mut self, now_ms: f64) {
        self.reset(now_ms);
        self.force_resync = true;
    }

    /// Consume the resync request (true at most once per `initialize`)
    pub fn take_force_resync(&mut self) -> bool {
        std::mem::take(&mut self.force_resync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::difficulty::DifficultyLevel;
    use crate::sim::generate::RowGenerator;

    struct World {
        level: LevelBuffer,
        score: Score,
        profile: DifficultyProfile,
    }

    impl World {
        fn new() -> Self {
            let profile = DifficultyLevel::Medium.profile();
            Self {
                level: LevelBuffer::new(RowGenerator::new(11), &profile),
                score: Score::new(),
                profile,
            }
        }

        fn step(&mut self, player: &mut Player, now_ms: f64) -> Option<StepOutcome> {
            player.step_completed(now_ms, &mut self.level, &mut self.score, &self.profile)
        }
    }

    #[test]
    fn test_queue_then_resolve() {
        let mut world = World::new();
        let mut player = Player::new();

        assert!(player.queue_move(MoveDirection::Forward).is_accepted());
        assert!(player.queue_move(MoveDirection::Left).is_accepted());
        assert!(!player.is_idle());
        // Committed position is unchanged until steps resolve
        assert_eq!(player.position(), GridPosition::new(0, 0));

        let first = world.step(&mut player, 100.0).unwrap();
        assert_eq!(first.direction, MoveDirection::Forward);
        assert!(first.row_changed && first.new_max_row);
        assert_eq!(world.score.value(), 1);
        assert_eq!(player.last_row_change_ms, 100.0);

        let second = world.step(&mut player, 200.0).unwrap();
        assert_eq!(second.position, GridPosition::new(1, -1));
        assert!(!second.row_changed);
        assert_eq!(player.last_row_change_ms, 100.0);
        assert!(player.is_idle());

        assert_eq!(world.step(&mut player, 300.0), None);
    }

    #[test]
    fn test_invalid_move_is_dropped() {
        let mut player = Player::new();
        for _ in 0..MAX_TILE_INDEX {
            assert!(player.queue_move(MoveDirection::Right).is_accepted());
        }
        // Queue already ends at the right edge
        assert_eq!(player.queue_move(MoveDirection::Right), MoveResult::Rejected);
        assert_eq!(player.pending_moves().count(), MAX_TILE_INDEX as usize);
    }

    #[test]
    fn test_backward_does_not_score() {
        let mut world = World::new();
        let mut player = Player::new();

        for direction in [
            MoveDirection::Forward,
            MoveDirection::Forward,
            MoveDirection::Backward,
            MoveDirection::Forward,
        ] {
            player.queue_move(direction);
        }
        while world.step(&mut player, 0.0).is_some() {}

        assert_eq!(player.current_row, 2);
        assert_eq!(world.score.value(), 2);
    }

    #[test]
    fn test_steps_keep_lookahead() {
        let mut world = World::new();
        let mut player = Player::new();

        for _ in 0..60 {
            player.queue_move(MoveDirection::Forward);
            world.step(&mut player, 0.0);
            assert!(world.level.len() as i32 > player.current_row + LOOKAHEAD_ROWS as i32);
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut player = Player::new();
        player.current_row = 7;
        player.current_tile = -3;
        player.queue_move(MoveDirection::Forward);

        player.reset(50.0);
        let once = player.clone();
        player.reset(50.0);

        assert_eq!(player.position(), once.position());
        assert_eq!(player.pending_moves().count(), 0);
        assert_eq!(player.last_row_change_ms, once.last_row_change_ms);
        assert_eq!(player.position(), GridPosition::default());
    }

    #[test]
    fn test_initialize_requests_one_resync() {
        let mut player = Player::new();
        player.queue_move(MoveDirection::Forward);
        player.initialize(0.0);

        assert!(player.is_idle());
        assert!(player.take_force_resync());
        assert!(!player.take_force_resync());
    }
}
