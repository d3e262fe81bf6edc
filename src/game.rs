//! Game composition root
//!
//! `Game` owns every stateful component and is the only thing the renderer,
//! audio and UI layers talk to. Input calls (`queue_move`), the renderer's
//! animation callback (`step_completed`) and the per-frame tick (`frame`) all
//! run on one thread; listeners registered with `subscribe` hear about
//! everything that happens, synchronously.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::difficulty::{DifficultyLevel, DifficultyProfile, DifficultyStore};
use crate::leaderboard::{Admission, Leaderboard};
use crate::observer::{Observers, SubscriptionId};
use crate::platform::{self, KeyValueStore};
use crate::sim::{
    CollisionDetector, GridPosition, Hit, LevelBuffer, MoveDirection, MoveResult, Player, Row,
    RowGenerator, Score, StepOutcome,
};

/// Current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no run in progress
    #[default]
    Home,
    /// Active run
    Playing,
    /// Run suspended; obstacle time frozen
    Paused,
    /// Run ended by a collision
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Home => "home",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "gameover",
        }
    }
}

/// Notifications for audio, UI and renderer collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    MoveAccepted(MoveDirection),
    StepResolved { row: i32, tile: i32 },
    ScoreChanged(u32),
    /// Every `MILESTONE_INTERVAL` rows of new progress
    Milestone { row: i32 },
    Hit(Hit),
    GameOver { score: u32, admission: Admission },
    PhaseChanged(GamePhase),
}

#[derive(Debug)]
pub struct Game {
    phase: GamePhase,
    difficulty: DifficultyStore,
    leaderboard: Leaderboard,
    level: LevelBuffer,
    player: Player,
    score: Score,
    detector: CollisionDetector,
    /// Obstacle clock in seconds since the run started
    elapsed_secs: f64,
    /// Fixed seed for reproducible levels; entropy when `None`
    seed: Option<u64>,
    runs_started: u64,
    last_admission: Option<Admission>,
    observers: Observers<GameEvent>,
}

impl Game {
    /// Game with freshly randomized levels
    pub fn new(difficulty: DifficultyStore, leaderboard: Leaderboard) -> Self {
        Self::build(difficulty, leaderboard, None)
    }

    /// Game whose levels are reproducible from `seed`
    pub fn with_seed(difficulty: DifficultyStore, leaderboard: Leaderboard, seed: u64) -> Self {
        Self::build(difficulty, leaderboard, Some(seed))
    }

    /// Load difficulty and leaderboard from a durable store (shared by both)
    /// and a session store
    pub fn open<D>(durable: D, session: impl KeyValueStore + 'static, seed: Option<u64>) -> Self
    where
        D: KeyValueStore + Clone + 'static,
    {
        let difficulty = DifficultyStore::load(Box::new(durable.clone()));
        let leaderboard = Leaderboard::load(Box::new(durable), Box::new(session));
        Self::build(difficulty, leaderboard, seed)
    }

    fn build(difficulty: DifficultyStore, leaderboard: Leaderboard, seed: Option<u64>) -> Self {
        let generator = Self::generator_for(seed, 0);
        let level = LevelBuffer::new(generator, difficulty.profile());
        Self {
            phase: GamePhase::Home,
            difficulty,
            leaderboard,
            level,
            player: Player::new(),
            score: Score::new(),
            detector: CollisionDetector::new(),
            elapsed_secs: 0.0,
            seed,
            runs_started: 0,
            last_admission: None,
            observers: Observers::new(),
        }
    }

    fn generator_for(seed: Option<u64>, run: u64) -> RowGenerator {
        match seed {
            Some(seed) => RowGenerator::new(seed.wrapping_add(run)),
            None => RowGenerator::from_entropy(),
        }
    }

    /// Begin a new run from the spawn row
    pub fn start_run(&mut self, now_ms: f64) {
        self.runs_started += 1;
        let generator = Self::generator_for(self.seed, self.runs_started);
        self.level = LevelBuffer::new(generator, self.difficulty.profile());
        self.player.initialize(now_ms);
        self.score.reset();
        self.elapsed_secs = 0.0;
        self.last_admission = None;

        log::info!(
            "Run {} started ({})",
            self.runs_started,
            self.difficulty.get().as_str()
        );
        self.emit(GameEvent::ScoreChanged(0));
        self.set_phase(GamePhase::Playing);
    }

    /// Validate and enqueue a move. Only accepted during a run.
    pub fn queue_move(&mut self, direction: MoveDirection) -> MoveResult {
        if self.phase != GamePhase::Playing {
            return MoveResult::Rejected;
        }
        let result = self.player.queue_move(direction);
        if result.is_accepted() {
            self.emit(GameEvent::MoveAccepted(direction));
        }
        result
    }

    /// Renderer callback: the hop animation for the oldest queued move ended
    pub fn step_completed(&mut self, now_ms: f64) -> Option<StepOutcome> {
        let outcome = self.player.step_completed(
            now_ms,
            &mut self.level,
            &mut self.score,
            self.difficulty.profile(),
        )?;

        self.emit(GameEvent::StepResolved {
            row: outcome.position.row,
            tile: outcome.position.tile,
        });
        if outcome.new_max_row {
            let score = self.score.value();
            self.emit(GameEvent::ScoreChanged(score));
            if score % MILESTONE_INTERVAL == 0 {
                self.emit(GameEvent::Milestone {
                    row: outcome.position.row,
                });
            }
        }
        Some(outcome)
    }

    /// Per-frame tick. Advances obstacle time during a run, then checks the
    /// player's committed cell for collisions. The first hit of a run ends it.
    pub fn frame(&mut self, dt_secs: f64, now_ms: f64) -> Option<Hit> {
        if self.phase == GamePhase::Playing {
            self.elapsed_secs += dt_secs.max(0.0);
        }

        let snapshot = self.player.position();
        let hit = self
            .detector
            .check_collisions(snapshot, &self.level, self.elapsed_secs)?;

        log::debug!(
            "Hit {:?} at row {} (player {},{})",
            hit.kind,
            hit.row,
            snapshot.row,
            snapshot.tile
        );
        self.emit(GameEvent::Hit(hit));
        if self.phase == GamePhase::Playing {
            self.game_over(now_ms);
        }
        Some(hit)
    }

    fn game_over(&mut self, now_ms: f64) {
        self.player.clear_queue();
        let score = self.score.value();
        let admission = self.leaderboard.add_score(score, &platform::format_date(now_ms));
        self.last_admission = Some(admission);

        log::info!("Game over: score {} ({:?})", score, admission);
        self.set_phase(GamePhase::GameOver);
        self.emit(GameEvent::GameOver { score, admission });
    }

    /// Suspend a run. Returns false outside `Playing`.
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.set_phase(GamePhase::Paused);
        true
    }

    /// Continue a paused run. Returns false outside `Paused`.
    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.set_phase(GamePhase::Playing);
        true
    }

    /// Back to the title screen, abandoning any run
    pub fn return_home(&mut self) {
        self.player.clear_queue();
        self.set_phase(GamePhase::Home);
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            self.phase = phase;
            self.emit(GameEvent::PhaseChanged(phase));
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.observers.notify(&event);
    }

    /// Player back to spawn with an empty queue
    pub fn reset_player(&mut self, now_ms: f64) {
        self.player.reset(now_ms);
    }

    /// `reset_player` plus a one-shot renderer resync
    pub fn initialize_player_position(&mut self, now_ms: f64) {
        self.player.initialize(now_ms);
    }

    /// Submit a score directly, dated `now_ms`
    pub fn add_score(&mut self, score: u32, now_ms: f64) -> Admission {
        self.leaderboard.add_score(score, &platform::format_date(now_ms))
    }

    /// Change difficulty. Rows generated from now on use the new profile.
    pub fn set_difficulty(&mut self, level: DifficultyLevel) {
        self.difficulty.set(level);
    }

    /// Append one batch if `row` is within the lookahead of the level end
    pub fn ensure_ahead(&mut self, row: i32) -> usize {
        self.level.ensure_ahead(row, self.difficulty.profile())
    }

    /// Generate rows with the current difficulty without appending them
    pub fn generate(&mut self, count: usize) -> Vec<Row> {
        self.level.generate(count, self.difficulty.profile())
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn position(&self) -> GridPosition {
        self.player.position()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Consume the renderer resync request set by `initialize_player_position`
    pub fn take_force_resync(&mut self) -> bool {
        self.player.take_force_resync()
    }

    pub fn score(&self) -> u32 {
        self.score.value()
    }

    pub fn level(&self) -> &LevelBuffer {
        &self.level
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn difficulty(&self) -> &DifficultyStore {
        &self.difficulty
    }

    pub fn difficulty_mut(&mut self) -> &mut DifficultyStore {
        &mut self.difficulty
    }

    pub fn profile(&self) -> &DifficultyProfile {
        self.difficulty.profile()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn leaderboard_mut(&mut self) -> &mut Leaderboard {
        &mut self.leaderboard
    }

    /// Leaderboard outcome of the last finished run
    pub fn last_admission(&self) -> Option<Admission> {
        self.last_admission
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }
}
