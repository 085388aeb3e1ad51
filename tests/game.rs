/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use draughts::{
    best_move, outcome, Board, Config, Game, GameOutcome, LearningParams, Piece, QAgent, Search,
    SearchConfig, Side, Square, StateKey, Strategy, TableStore, ValueTable,
};

fn minimax_game(config: Config, ai_side: Side) -> Game {
    let strategy = Strategy::Minimax(config.search);
    Game::new(config, strategy, ai_side, None).unwrap()
}

#[test]
fn test_draw_after_turn_ceiling() {
    let board = Board::default();
    for turns in 0..64 {
        assert_eq!(outcome(&board, turns, 64), None);
    }
    assert_eq!(outcome(&board, 64, 64), Some(GameOutcome::Draw));
    assert_eq!(outcome(&board, 65, 64), Some(GameOutcome::Draw));
}

#[test]
fn test_game_reaches_draw() {
    let mut config = Config::play();
    config.turn_ceiling = 2;
    let mut game = minimax_game(config, Side::North);

    assert!(game.try_human_move(Square::new(3, 3), Square::new(2, 2)));
    assert!(game.outcome().is_none());
    assert!(game.apply_ai_move().is_some());

    assert_eq!(game.outcome(), Some(GameOutcome::Draw));
    assert!(!game.is_ai_turn());
    assert!(!game.try_human_move(Square::new(2, 2), Square::new(1, 1)));
}

#[test]
fn test_minimax_is_deterministic() {
    let board = Board::new(6).unwrap();
    let config = SearchConfig { depth: 4 };

    let first = Search::new(&board, Side::North, config).start();
    for _ in 0..3 {
        assert_eq!(Search::new(&board, Side::North, config).start(), first);
    }
}

#[test]
fn test_minimax_self_play() {
    // Both sides searching three plies deep; South opens
    let mut board = Board::default();
    let mut side = Side::South;
    let mut turns = 0;

    let result = loop {
        if let Some(result) = outcome(&board, turns, 64) {
            break result;
        }
        if let Some(next) = best_move(&board, side, 3) {
            board = next;
        }
        turns += 1;
        side = side.opponent();
    };

    assert_eq!(result, GameOutcome::Winner(Side::North));
    assert_eq!(turns, 6);

    let expected = Board::from_pieces(
        4,
        [
            (Square::new(2, 0), Piece::man(Side::North)),
            (Square::new(3, 3), Piece::king(Side::North)),
        ],
    )
    .unwrap();
    assert_eq!(board, expected);
}

#[test]
fn test_north_opening_reply() {
    let board = Board::default();
    let best = best_move(&board, Side::North, 3).unwrap();
    assert_eq!(best.piece_at(Square::new(1, 1)), Some(Piece::man(Side::North)));
    assert_eq!(best.piece_at(Square::new(0, 0)), None);
}

#[test]
fn test_illegal_human_moves_are_rejected() {
    let mut game = minimax_game(Config::play(), Side::North);
    let before = game.current_board().clone();

    // Backwards, onto a light square, off the board, and from an empty square
    for (from, to) in [((3, 1), (4, 2)), ((3, 1), (2, 1)), ((3, 3), (2, 4)), ((2, 2), (1, 1))] {
        let from = Square::new(from.0, from.1);
        let to = Square::new(to.0, to.1);
        assert!(!game.try_human_move(from, to), "{from} -> {to} was accepted");
    }

    assert_eq!(game.current_board(), &before);
    assert_eq!(game.turns(), 0);
    assert_eq!(game.legal_successors().len(), 3);
}

#[test]
fn test_learning_game_checkpoints_every_move() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q.json");

    let mut config = Config::play();
    config.table_path = path.clone();
    config.learning = LearningParams {
        epsilon: 0.0,
        ..Default::default()
    };

    let agent = QAgent::new(ValueTable::new(), config.learning, Some(3));
    let store = TableStore::new(&path);
    let mut game = Game::new(
        config,
        Strategy::QLearning(Box::new(agent)),
        Side::North,
        Some(store),
    )
    .unwrap();

    assert!(game.try_human_move(Square::new(3, 1), Square::new(2, 0)));
    let state = StateKey::new(game.current_board());
    let next = game.apply_ai_move().unwrap();
    let action = StateKey::new(&next);

    let saved = TableStore::new(&path).load();
    let learned = game.strategy().agent().unwrap().table().get(state.as_str(), action.as_str());
    assert_eq!(saved.get(state.as_str(), action.as_str()), learned);
    assert!(saved.row(state.as_str()).is_some());
}
