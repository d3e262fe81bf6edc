use std::cell::RefCell;
use std::rc::Rc;

use pixel_tanks::leaderboard::MAX_LEADERBOARD_ENTRIES;
use pixel_tanks::platform::{FileStore, MemoryStore};
use pixel_tanks::sim::{GridPosition, HitKind, MoveDirection, Row};
use pixel_tanks::{Admission, DifficultyLevel, Game, GameEvent, GamePhase};

/// Queue and resolve moves to the first tree at or beyond `min_row`,
/// skipping the collision check until the player stands on it
fn walk_into_tree(game: &mut Game, min_row: usize) -> GridPosition {
    let here = game.position();
    let (row, tile) = game
        .level()
        .rows()
        .iter()
        .enumerate()
        .skip(min_row.max(here.row as usize + 1))
        .find_map(|(i, row)| match row {
            Row::Forest { trees } => trees.first().map(|t| (i as i32, t.tile_index)),
            Row::Car { .. } => None,
        })
        .expect("a forest row ahead");

    let mut moves = vec![MoveDirection::Forward; (row - here.row) as usize];
    let delta = tile - here.tile;
    let lateral = if delta > 0 {
        MoveDirection::Right
    } else {
        MoveDirection::Left
    };
    moves.extend(std::iter::repeat_n(lateral, delta.unsigned_abs() as usize));

    for m in moves {
        assert!(game.queue_move(m).is_accepted(), "{:?} rejected", m);
        assert!(game.step_completed(0.0).is_some());
    }
    GridPosition::new(row, tile)
}

#[test]
fn test_run_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();

    let mut game = Game::open(FileStore::new(dir.path()), MemoryStore::new(), Some(3));
    game.set_difficulty(DifficultyLevel::Easy);
    game.leaderboard_mut().set_player_name("Alice");

    game.start_run(0.0);
    let target = walk_into_tree(&mut game, 3);
    let hit = game.frame(1.0 / 60.0, 0.0).expect("standing on a tree");
    assert_eq!(hit.kind, HitKind::Tree);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert_eq!(game.score(), target.row as u32);
    drop(game);

    // New session: same durable directory, empty session store
    let reopened = Game::open(FileStore::new(dir.path()), MemoryStore::new(), None);
    assert_eq!(reopened.difficulty().get(), DifficultyLevel::Easy);
    assert!(reopened.leaderboard().needs_player_name());

    let entries = reopened.leaderboard().entries();
    assert_eq!(entries.len(), MAX_LEADERBOARD_ENTRIES);
    assert_eq!(entries[0].name, "Alice");
    assert_eq!(entries[0].score, target.row as u32);
    assert!(entries[1..].iter().all(|e| e.is_placeholder()));
}

#[test]
fn test_event_stream_for_a_run() {
    let mut game = Game::open(MemoryStore::new(), MemoryStore::new(), Some(9));
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    game.subscribe(move |e: &GameEvent| sink.borrow_mut().push(e.clone()));

    game.start_run(0.0);
    let target = walk_into_tree(&mut game, 1);
    game.frame(0.0, 0.0);

    let events = events.borrow();
    assert_eq!(events.first(), Some(&GameEvent::ScoreChanged(0)));
    assert_eq!(
        events.get(1),
        Some(&GameEvent::PhaseChanged(GamePhase::Playing))
    );
    assert!(events.contains(&GameEvent::StepResolved {
        row: target.row,
        tile: target.tile
    }));
    assert!(events.contains(&GameEvent::PhaseChanged(GamePhase::GameOver)));
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameOver {
            score: target.row as u32,
            admission: Admission::Admitted {
                rank: 1,
                new_high_score: true
            }
        })
    );
}

#[test]
fn test_lower_second_run_ranks_below_first() {
    let mut game = Game::open(MemoryStore::new(), MemoryStore::new(), Some(21));

    game.start_run(0.0);
    let first = walk_into_tree(&mut game, 8);
    game.frame(0.0, 0.0);
    assert_eq!(game.phase(), GamePhase::GameOver);

    game.start_run(0.0);
    let second = walk_into_tree(&mut game, 1);
    game.frame(0.0, 0.0);

    let first_score = first.row as u32;
    let second_score = second.row as u32;
    let scores: Vec<u32> = game.leaderboard().entries().iter().map(|e| e.score).collect();
    let mut expected = vec![first_score, second_score];
    expected.sort_by(|a, b| b.cmp(a));
    assert_eq!(&scores[..2], expected.as_slice());
    assert_eq!(game.runs_started(), 2);
}

#[test]
fn test_level_stays_ahead_of_long_runs() {
    let mut game = Game::open(MemoryStore::new(), MemoryStore::new(), Some(5));
    game.start_run(0.0);
    for _ in 0..150 {
        assert!(game.queue_move(MoveDirection::Forward).is_accepted());
        game.step_completed(0.0);
    }
    assert_eq!(game.score(), 150);
    assert!(game.level().len() > 150 + game.level().lookahead());
    assert_eq!(game.level().get(0), Some(&Row::empty()));
}
