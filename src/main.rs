//! Pixel Tanks entry point
//!
//! The browser build is driven from JavaScript through `web::WebGame`. The
//! native binary plays headless autopilot runs against on-disk storage and
//! prints the resulting leaderboard.
//!
//! Usage: `pixel-tanks [--data-dir DIR] [--difficulty easy|medium|hard] [--runs N]`

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use std::path::PathBuf;

    use clap::{Parser, ValueEnum};

    use pixel_tanks::platform::{FileStore, MemoryStore, now_ms};
    use pixel_tanks::sim::{GridPosition, MoveDirection, Row, vehicle_hits_player};
    use pixel_tanks::{DifficultyLevel, Game, GamePhase, tile_in_range};

    const FRAME_SECS: f64 = 1.0 / 60.0;
    /// Frames per hop animation (0.2 s)
    const STEP_FRAMES: u64 = 12;
    /// Frames a cell must stay clear before the autopilot moves into it
    const SAFETY_FRAMES: u32 = 2 * STEP_FRAMES as u32 + 3;
    /// Abandon a run that survives this long
    const MAX_RUN_SECS: f64 = 300.0;
    const DEFAULT_RUNS: u32 = 3;

    #[derive(Parser, Debug)]
    #[command(name = "pixel-tanks")]
    #[command(about = "Play headless Pixel Tanks runs and print the leaderboard")]
    pub struct Options {
        /// Directory holding the difficulty and leaderboard
        #[arg(long, default_value = ".pixel-tanks")]
        data_dir: PathBuf,

        /// Difficulty for these runs (keeps the stored setting if omitted)
        #[arg(long, value_enum)]
        difficulty: Option<DifficultyArg>,

        /// Number of runs to play
        #[arg(long, default_value_t = DEFAULT_RUNS)]
        runs: u32,
    }

    #[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
    enum DifficultyArg {
        Easy,
        Medium,
        Hard,
    }

    impl From<DifficultyArg> for DifficultyLevel {
        fn from(arg: DifficultyArg) -> Self {
            match arg {
                DifficultyArg::Easy => DifficultyLevel::Easy,
                DifficultyArg::Medium => DifficultyLevel::Medium,
                DifficultyArg::Hard => DifficultyLevel::Hard,
            }
        }
    }

    /// Whether no vehicle in `row` touches `tile` over the next few frames
    fn lane_is_clear(game: &Game, row: i32, tile: i32) -> bool {
        let Some(Row::Car {
            direction,
            speed,
            vehicles,
        }) = game.level().get(row)
        else {
            return true;
        };
        let cell = GridPosition::new(row, tile);
        let now = game.elapsed_secs();
        (0..=SAFETY_FRAMES).all(|i| {
            let t = now + f64::from(i) * FRAME_SECS;
            vehicles.iter().all(|v| {
                !vehicle_hits_player(row, v.initial_tile_index, *speed, *direction, t, cell)
            })
        })
    }

    fn is_safe(game: &Game, from: GridPosition, direction: MoveDirection) -> bool {
        let to = from.step(direction);
        to.row >= 0
            && tile_in_range(to.tile)
            && !game.level().get(to.row).is_some_and(|r| r.has_tree_at(to.tile))
            && lane_is_clear(game, to.row, to.tile)
    }

    fn choose_move(game: &Game) -> Option<MoveDirection> {
        let here = game.position();
        if is_safe(game, here, MoveDirection::Forward) {
            return Some(MoveDirection::Forward);
        }
        let tree_ahead = game
            .level()
            .get(here.row + 1)
            .is_some_and(|r| r.has_tree_at(here.tile));
        if tree_ahead || !lane_is_clear(game, here.row, here.tile) {
            return [
                MoveDirection::Left,
                MoveDirection::Right,
                MoveDirection::Backward,
            ]
            .into_iter()
            .find(|d| is_safe(game, here, *d));
        }
        // Wait for the lane ahead to clear
        None
    }

    pub fn run(options: Options) {
        log::info!(
            "Storing data in {} ({} runs)",
            options.data_dir.display(),
            options.runs
        );
        let mut game = Game::open(FileStore::new(&options.data_dir), MemoryStore::new(), None);
        if let Some(level) = options.difficulty {
            game.set_difficulty(level.into());
        }
        if game.leaderboard().needs_player_name() {
            game.leaderboard_mut().set_player_name("Autopilot");
        }

        let mut clock_ms = now_ms();
        for run in 1..=options.runs {
            game.start_run(clock_ms);
            let mut frames: u64 = 0;

            while game.phase() == GamePhase::Playing {
                frames += 1;
                clock_ms += FRAME_SECS * 1000.0;

                if frames % STEP_FRAMES == 0 {
                    game.step_completed(clock_ms);
                    if game.player().is_idle() {
                        if let Some(direction) = choose_move(&game) {
                            game.queue_move(direction);
                        }
                    }
                }
                game.frame(FRAME_SECS, clock_ms);

                if game.elapsed_secs() >= MAX_RUN_SECS {
                    log::info!("Run {} survived {} s, stopping", run, MAX_RUN_SECS);
                    game.return_home();
                }
            }

            log::info!(
                "Run {} finished: score {} after {:.1} s ({:?})",
                run,
                game.score(),
                game.elapsed_secs(),
                game.last_admission()
            );
        }

        println!(
            "\nLeaderboard ({})",
            game.difficulty().get().as_str()
        );
        for entry in game.leaderboard().entries() {
            println!(
                "{:>2}. {:<12} {:>5}  {}",
                entry.rank, entry.name, entry.score, entry.date
            );
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Pixel Tanks (native autoplay) starting...");

    autoplay::run(autoplay::Options::parse());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::init, this is just to satisfy the compiler
}
