//! Browser bindings
//!
//! Exposes `Game` to the JavaScript renderer, menus and audio layer. Storage
//! is `localStorage` for the difficulty and leaderboard and `sessionStorage`
//! for the player name. Structured values cross the boundary as JSON strings.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::difficulty::DifficultyLevel;
use crate::game::{Game, GameEvent};
use crate::platform::{self, WebStorage};
use crate::sim::{MoveDirection, Row, vehicle_world_x};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Pixel Tanks core loaded");
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    events: Rc<RefCell<Vec<GameEvent>>>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let durable = WebStorage::local().map_err(to_js)?;
        let session = WebStorage::session().map_err(to_js)?;
        let mut game = Game::open(durable, session, None);

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        game.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        Ok(Self { game, events })
    }

    /// Events since the last call, as a JSON array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        let drained: Vec<GameEvent> = self.events.borrow_mut().drain(..).collect();
        serde_json::to_string(&drained).map_err(to_js)
    }

    pub fn start(&mut self) {
        self.game.start_run(platform::now_ms());
    }

    pub fn pause(&mut self) -> bool {
        self.game.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.game.resume()
    }

    #[wasm_bindgen(js_name = returnHome)]
    pub fn return_home(&mut self) {
        self.game.return_home();
    }

    pub fn phase(&self) -> String {
        self.game.phase().as_str().to_string()
    }

    /// Per-frame tick; returns true if the player overlaps an obstacle
    pub fn frame(&mut self, dt_secs: f64) -> bool {
        self.game.frame(dt_secs, platform::now_ms()).is_some()
    }

    /// `direction` is one of forward/backward/left/right
    #[wasm_bindgen(js_name = queueMove)]
    pub fn queue_move(&mut self, direction: &str) -> bool {
        match MoveDirection::from_str(direction) {
            Some(direction) => self.game.queue_move(direction).is_accepted(),
            None => {
                log::warn!("Unknown move direction {:?}", direction);
                false
            }
        }
    }

    /// Returns false if no move was pending
    #[wasm_bindgen(js_name = stepCompleted)]
    pub fn step_completed(&mut self) -> bool {
        self.game.step_completed(platform::now_ms()).is_some()
    }

    #[wasm_bindgen(js_name = resetPlayer)]
    pub fn reset_player(&mut self) {
        self.game.reset_player(platform::now_ms());
    }

    #[wasm_bindgen(js_name = initializePlayerPosition)]
    pub fn initialize_player_position(&mut self) {
        self.game.initialize_player_position(platform::now_ms());
    }

    #[wasm_bindgen(js_name = takeForceResync)]
    pub fn take_force_resync(&mut self) -> bool {
        self.game.take_force_resync()
    }

    #[wasm_bindgen(js_name = currentRow)]
    pub fn current_row(&self) -> i32 {
        self.game.position().row
    }

    #[wasm_bindgen(js_name = currentTile)]
    pub fn current_tile(&self) -> i32 {
        self.game.position().tile
    }

    #[wasm_bindgen(js_name = lastRowChangeMs)]
    pub fn last_row_change_ms(&self) -> f64 {
        self.game.player().last_row_change_ms
    }

    pub fn score(&self) -> u32 {
        self.game.score()
    }

    #[wasm_bindgen(js_name = elapsedSecs)]
    pub fn elapsed_secs(&self) -> f64 {
        self.game.elapsed_secs()
    }

    #[wasm_bindgen(js_name = ensureAhead)]
    pub fn ensure_ahead(&mut self, row: i32) -> usize {
        self.game.ensure_ahead(row)
    }

    /// Fresh rows with the current difficulty, as JSON (not appended)
    pub fn generate(&mut self, count: usize) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.generate(count)).map_err(to_js)
    }

    #[wasm_bindgen(js_name = levelLength)]
    pub fn level_length(&self) -> usize {
        self.game.level().len()
    }

    /// Slice of the level buffer as JSON
    #[wasm_bindgen(js_name = rowsJson)]
    pub fn rows_json(&self, start: usize, count: usize) -> Result<String, JsValue> {
        let rows = self.game.level().rows();
        let start = start.min(rows.len());
        let end = start.saturating_add(count).min(rows.len());
        serde_json::to_string(&rows[start..end]).map_err(to_js)
    }

    /// Current world x of a vehicle, for the renderer
    #[wasm_bindgen(js_name = vehicleX)]
    pub fn vehicle_x(&self, row: i32, index: usize) -> Option<f32> {
        match self.game.level().get(row)? {
            Row::Car {
                direction,
                speed,
                vehicles,
            } => vehicles.get(index).map(|v| {
                vehicle_world_x(
                    v.initial_tile_index,
                    *speed,
                    *direction,
                    self.game.elapsed_secs(),
                )
            }),
            Row::Forest { .. } => None,
        }
    }

    pub fn difficulty(&self) -> String {
        self.game.difficulty().get().as_str().to_string()
    }

    #[wasm_bindgen(js_name = setDifficulty)]
    pub fn set_difficulty(&mut self, level: &str) -> bool {
        match DifficultyLevel::from_str(level) {
            Some(level) => {
                self.game.set_difficulty(level);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = addScore)]
    pub fn add_score(&mut self, score: u32) -> bool {
        self.game.add_score(score, platform::now_ms()).is_admitted()
    }

    #[wasm_bindgen(js_name = getEntries)]
    pub fn get_entries(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.game.leaderboard().entries()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = isNewHighScore)]
    pub fn is_new_high_score(&self) -> bool {
        self.game.leaderboard().is_new_high_score()
    }

    #[wasm_bindgen(js_name = wouldBeHighScore)]
    pub fn would_be_high_score(&self, score: u32) -> bool {
        self.game.leaderboard().would_be_high_score(score)
    }

    #[wasm_bindgen(js_name = needsPlayerName)]
    pub fn needs_player_name(&self) -> bool {
        self.game.leaderboard().needs_player_name()
    }

    #[wasm_bindgen(js_name = setPlayerName)]
    pub fn set_player_name(&mut self, name: &str) {
        self.game.leaderboard_mut().set_player_name(name);
    }

    #[wasm_bindgen(js_name = playerName)]
    pub fn player_name(&self) -> String {
        self.game.leaderboard().player_name().to_string()
    }

    #[wasm_bindgen(js_name = updateUsernameInLeaderboard)]
    pub fn update_username_in_leaderboard(&mut self, old: &str, new: &str) -> bool {
        self.game
            .leaderboard_mut()
            .update_username_in_leaderboard(old, new)
    }

    #[wasm_bindgen(js_name = resetLeaderboard)]
    pub fn reset_leaderboard(&mut self) {
        self.game.leaderboard_mut().reset_leaderboard();
    }
}
