/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::Result;

use crate::{
    find_move, AgentStep, Board, Config, QAgent, Search, SearchConfig, Side, Square, StoreError,
    TableStore,
};

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// The given side captured every enemy piece.
    Winner(Side),

    /// The turn ceiling was reached with both sides still on the board.
    Draw,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner(side) => write!(f, "{side} wins"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

/// Decides whether the game on `board` is over after `turns` turns.
///
/// A side with no pieces left loses. Otherwise, reaching `ceiling` turns is a draw.
///
/// # Example
/// ```
/// # use draughts::{outcome, Board, GameOutcome};
/// let board = Board::default();
/// assert_eq!(outcome(&board, 0, 64), None);
/// assert_eq!(outcome(&board, 64, 64), Some(GameOutcome::Draw));
/// ```
pub fn outcome(board: &Board, turns: usize, ceiling: usize) -> Option<GameOutcome> {
    if board.count(Side::North) == 0 {
        Some(GameOutcome::Winner(Side::South))
    } else if board.count(Side::South) == 0 {
        Some(GameOutcome::Winner(Side::North))
    } else if turns >= ceiling {
        Some(GameOutcome::Draw)
    } else {
        None
    }
}

/// The policy the computer plays with.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Fixed-depth alpha-beta search.
    Minimax(SearchConfig),

    /// Tabular Q-learning, which keeps learning while it plays.
    QLearning(Box<QAgent>),
}

impl Strategy {
    #[inline(always)]
    pub fn agent(&self) -> Option<&QAgent> {
        match self {
            Self::QLearning(agent) => Some(agent),
            Self::Minimax(_) => None,
        }
    }
}

/// One game between a human and the computer.
///
/// This owns all mutable game state: the board, whose turn it is, the turn counter,
/// and the computer's strategy (including any learned table).
#[derive(Debug)]
pub struct Game {
    /// Board every new game starts from.
    start: Board,

    /// Current board.
    board: Board,

    /// Side whose turn it is.
    to_move: Side,

    /// Number of turns played so far, passes included.
    turns: usize,

    /// Side played by the computer.
    ai_side: Side,

    strategy: Strategy,

    /// Where a learned table is merged to, if anywhere.
    store: Option<TableStore>,

    config: Config,

    /// Set once the end of the current game has been recorded.
    finished: bool,
}

impl Game {
    /// Starts a game on a fresh board of `config.board_size`, with the computer playing `ai_side`.
    pub fn new(
        config: Config,
        strategy: Strategy,
        ai_side: Side,
        store: Option<TableStore>,
    ) -> Result<Self> {
        config.validate()?;
        let start = Board::new(config.board_size)?;

        Ok(Self {
            board: start.clone(),
            start,
            to_move: config.first_side,
            turns: 0,
            ai_side,
            strategy,
            store,
            config,
            finished: false,
        })
    }

    #[inline(always)]
    pub fn current_board(&self) -> &Board {
        &self.board
    }

    #[inline(always)]
    pub fn side_to_move(&self) -> Side {
        self.to_move
    }

    #[inline(always)]
    pub fn turns(&self) -> usize {
        self.turns
    }

    #[inline(always)]
    pub fn ai_side(&self) -> Side {
        self.ai_side
    }

    #[inline(always)]
    pub fn human_side(&self) -> Side {
        self.ai_side.opponent()
    }

    #[inline(always)]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns `true` if it is the computer's turn in an unfinished game.
    #[inline(always)]
    pub fn is_ai_turn(&self) -> bool {
        self.outcome().is_none() && self.to_move == self.ai_side
    }

    /// Every board the side to move can reach from the current board.
    #[inline(always)]
    pub fn legal_successors(&self) -> Vec<Board> {
        crate::legal_successors(&self.board, self.to_move)
    }

    /// The verdict on the current game, if it is over.
    #[inline(always)]
    pub fn outcome(&self) -> Option<GameOutcome> {
        outcome(&self.board, self.turns, self.config.turn_ceiling)
    }

    /// Plays the human's move from `from` to `to`.
    ///
    /// Returns `false`, leaving the game untouched, if the game is over, it isn't the human's turn,
    /// or the move is not legal.
    pub fn try_human_move(&mut self, from: Square, to: Square) -> bool {
        if self.outcome().is_some() || self.to_move != self.human_side() {
            return false;
        }

        let Some(mv) = find_move(&self.board, self.to_move, from, to) else {
            return false;
        };

        self.board = self.board.with_move_made(mv);
        self.end_turn();
        true
    }

    /// Passes the turn if the side to move has no legal moves, returning `true` if it did.
    ///
    /// The board is unchanged and the pass counts toward the turn ceiling.
    pub fn pass_if_stuck(&mut self) -> bool {
        if self.outcome().is_some() || self.board.has_moves(self.to_move) {
            return false;
        }

        tracing::debug!(side = %self.to_move, "no legal moves; passing");
        self.end_turn();
        true
    }

    /// Lets the computer play its turn, returning the board it moved to.
    ///
    /// Returns `None` if it isn't the computer's turn, or if the computer had no legal moves and passed.
    pub fn apply_ai_move(&mut self) -> Option<Board> {
        if !self.is_ai_turn() {
            return None;
        }

        let next = match &mut self.strategy {
            Strategy::Minimax(config) => Search::new(&self.board, self.ai_side, *config)
                .start()
                .bestmove,

            Strategy::QLearning(agent) => {
                match agent.act(
                    &self.board,
                    self.ai_side,
                    &self.config.rewards,
                    self.config.terminal.no_moves,
                ) {
                    AgentStep::Moved { board, .. } => Some(board),
                    AgentStep::Passed { .. } => None,
                }
            }
        };

        if let Some(board) = &next {
            self.board = board.clone();
        }

        if self.config.checkpoint_every_move && self.outcome().is_none() {
            self.checkpoint();
        }

        self.end_turn();
        next
    }

    /// Resets to the starting board, keeping the strategy and anything it learned.
    pub fn new_game(&mut self) {
        self.board = self.start.clone();
        self.to_move = self.config.first_side;
        self.turns = 0;
        self.finished = false;
    }

    /// Merges what the computer learned since the last save into the store, if there is both a learner and a store.
    pub fn save(&mut self) -> Result<(), StoreError> {
        match (&mut self.strategy, &self.store) {
            (Strategy::QLearning(agent), Some(store)) => agent.save_to(store),
            _ => Ok(()),
        }
    }

    /// Saves, logging rather than propagating a failure so the game can go on.
    fn checkpoint(&mut self) {
        if let Err(err) = self.save() {
            tracing::warn!(%err, "failed to save value table; continuing without saving");
        }
    }

    /// Hands the turn over, and records the result once the game ends.
    fn end_turn(&mut self) {
        self.turns += 1;
        self.to_move = self.to_move.opponent();

        let Some(outcome) = self.outcome() else {
            return;
        };
        if self.finished {
            return;
        }
        self.finished = true;
        tracing::info!(%outcome, turns = self.turns, "game over");

        let terminal = self.config.terminal;
        if let Strategy::QLearning(agent) = &mut self.strategy {
            let reward = match outcome {
                GameOutcome::Winner(side) if side == self.ai_side => Some(terminal.win),
                GameOutcome::Winner(_) => Some(terminal.loss),
                GameOutcome::Draw => terminal.update_on_draw.then_some(terminal.draw),
            };

            if let Some(reward) = reward {
                agent.record_terminal(&self.board, reward);
            }
            self.checkpoint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LearningParams, Piece, ValueTable};

    fn minimax_game() -> Game {
        Game::new(
            Config::play(),
            Strategy::Minimax(SearchConfig::default()),
            Side::North,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_outcome_prefers_win_over_draw() {
        let board = Board::from_pieces(4, [(Square::new(0, 0), Piece::man(Side::North))]).unwrap();
        assert_eq!(outcome(&board, 100, 64), Some(GameOutcome::Winner(Side::North)));
    }

    #[test]
    fn test_turns_alternate() {
        let mut game = minimax_game();
        assert_eq!(game.side_to_move(), Side::South);
        assert!(game.apply_ai_move().is_none());

        assert!(game.try_human_move(Square::new(3, 1), Square::new(2, 2)));
        assert_eq!(game.side_to_move(), Side::North);
        assert_eq!(game.turns(), 1);

        // Not the human's turn any more
        assert!(!game.try_human_move(Square::new(3, 3), Square::new(2, 0)));

        let reply = game.apply_ai_move().unwrap();
        assert_eq!(game.current_board(), &reply);
        assert_eq!(game.side_to_move(), Side::South);
        assert_eq!(game.turns(), 2);
    }

    #[test]
    fn test_illegal_move_is_noop() {
        let mut game = minimax_game();
        let before = game.current_board().clone();

        assert!(!game.try_human_move(Square::new(3, 1), Square::new(1, 1)));
        assert!(!game.try_human_move(Square::new(0, 0), Square::new(1, 1)));
        assert!(!game.try_human_move(Square::new(2, 2), Square::new(1, 1)));

        assert_eq!(game.current_board(), &before);
        assert_eq!(game.turns(), 0);
        assert_eq!(game.side_to_move(), Side::South);
    }

    #[test]
    fn test_new_game_resets() {
        let mut game = minimax_game();
        assert!(game.try_human_move(Square::new(3, 1), Square::new(2, 0)));
        game.apply_ai_move();
        game.new_game();

        assert_eq!(game.current_board(), &Board::default());
        assert_eq!(game.turns(), 0);
        assert_eq!(game.side_to_move(), Side::South);
    }

    #[test]
    fn test_ai_loss_is_recorded() {
        let params = LearningParams {
            epsilon: 0.0,
            ..Default::default()
        };
        let agent = QAgent::new(ValueTable::new(), params, Some(7));
        let mut config = Config::play();
        config.checkpoint_every_move = false;

        let mut game = Game::new(config, Strategy::QLearning(Box::new(agent)), Side::North, None).unwrap();

        // Rig a position where South captures North's last piece
        game.board = Board::from_pieces(
            4,
            [
                (Square::new(1, 1), Piece::man(Side::North)),
                (Square::new(2, 2), Piece::man(Side::South)),
            ],
        )
        .unwrap();

        assert!(game.try_human_move(Square::new(2, 2), Square::new(0, 0)));
        assert_eq!(game.outcome(), Some(GameOutcome::Winner(Side::South)));

        let final_key = crate::StateKey::new(game.current_board());
        let agent = game.strategy().agent().unwrap();
        assert_eq!(agent.table().get(final_key.as_str(), crate::TERMINAL_ACTION), -10.0);

        // Nothing happens once the game is over
        assert!(game.apply_ai_move().is_none());
        assert!(!game.try_human_move(Square::new(0, 0), Square::new(1, 1)));
    }
}
