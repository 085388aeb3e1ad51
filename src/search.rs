/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};

use crate::{legal_successors, Board, Evaluator, Score, Side};

/// Default depth, in plies, of a search.
pub const DEFAULT_DEPTH: usize = 3;

/// The result of a search, containing the best successor found, its score, and total nodes searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best successor board found during the search.
    ///
    /// `None` if the searching side had no legal moves.
    pub bestmove: Option<Board>,

    /// Evaluation of `bestmove`, from the searching side's perspective.
    pub score: Score,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Depth, in plies, to search from the root.
    ///
    /// Values below `1` are treated as `1`, since the root must look at least one move ahead.
    pub depth: usize,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
        }
    }
}

/// Executes a fixed-depth minimax search with alpha-beta pruning for one side.
///
/// Scores are always from the perspective of the searching side: that side maximizes, its opponent minimizes.
/// Sides strictly alternate at each ply.
/// A side with no legal moves at an interior ply passes: the board is unchanged and the opponent moves next.
/// A board where either side has no pieces left is terminal and is evaluated immediately.
pub struct Search<'a> {
    /// The board to search from.
    board: &'a Board,

    /// The side choosing a move at the root.
    side: Side,

    /// The result of the search, updated as-needed during search.
    result: SearchResult,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] choosing a successor of `board` for `side`.
    #[inline(always)]
    pub fn new(board: &'a Board, side: Side, config: SearchConfig) -> Self {
        Self {
            board,
            side,
            result: SearchResult::default(),
            config,
        }
    }

    /// Start the search, returning its results.
    pub fn start(mut self) -> SearchResult {
        self.best_move();

        tracing::debug!(
            side = %self.side,
            depth = self.config.depth.max(1),
            nodes = self.result.nodes,
            score = %self.result.score,
            "search complete"
        );

        self.result
    }

    /// Root of the search: picks the successor with the highest minimax value.
    ///
    /// The first successor reaching the best value wins, so generation order breaks ties.
    fn best_move(&mut self) {
        let depth = self.config.depth.max(1);
        let successors = legal_successors(self.board, self.side);

        self.result.nodes += 1;
        if successors.is_empty() {
            self.result.score = Evaluator::new(self.board).eval_for(self.side);
            return;
        }

        let mut alpha = -Score::INF;
        let beta = Score::INF;

        for successor in successors {
            let score = self.evaluate(&successor, depth - 1, self.side.opponent(), alpha, beta);

            if score > self.result.score || self.result.bestmove.is_none() {
                self.result.score = score;
                self.result.bestmove = Some(successor);
            }

            alpha = alpha.max(score);
        }
    }

    /// Interior of the search: the minimax value of `board` with `to_move` about to play, searched `depth` plies deeper.
    ///
    /// `alpha` is the best value the searching side is already guaranteed, and `beta` the best value its opponent is guaranteed.
    /// Remaining siblings are skipped once `beta <= alpha`.
    pub fn evaluate(
        &mut self,
        board: &Board,
        depth: usize,
        to_move: Side,
        mut alpha: Score,
        mut beta: Score,
    ) -> Score {
        self.result.nodes += 1;

        // If we've reached a terminal node, evaluate the position
        if depth == 0 || board.count(Side::North) == 0 || board.count(Side::South) == 0 {
            return Evaluator::new(board).eval_for(self.side);
        }

        let successors = legal_successors(board, to_move);

        // No legal moves; pass the turn without changing the board
        if successors.is_empty() {
            return self.evaluate(board, depth - 1, to_move.opponent(), alpha, beta);
        }

        if to_move == self.side {
            // Start with a *really bad* initial score
            let mut best = -Score::INF;

            for successor in successors {
                let score = self.evaluate(&successor, depth - 1, to_move.opponent(), alpha, beta);
                if score > best {
                    best = score;
                }
                alpha = alpha.max(score);
                if beta <= alpha {
                    break;
                }
            }

            best
        } else {
            let mut best = Score::INF;

            for successor in successors {
                let score = self.evaluate(&successor, depth - 1, to_move.opponent(), alpha, beta);
                if score < best {
                    best = score;
                }
                beta = beta.min(score);
                if beta <= alpha {
                    break;
                }
            }

            best
        }
    }
}

/// Convenience wrapper around [`Search`]: the best successor of `board` for `side`, searched `depth` plies deep.
///
/// Returns `None` if `side` has no legal moves.
///
/// # Example
/// ```
/// # use draughts::{best_move, Board, Side};
/// let board = Board::default();
/// let next = best_move(&board, Side::South, 3).unwrap();
/// assert_eq!(next.count(Side::South), 2);
/// ```
#[inline(always)]
pub fn best_move(board: &Board, side: Side, depth: usize) -> Option<Board> {
    Search::new(board, side, SearchConfig { depth })
        .start()
        .bestmove
}
