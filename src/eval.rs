/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Board, Score, Side};

/// Encapsulates the logic of scoring a board.
///
/// The evaluation is pure material: the difference in piece counts.
/// Kings are worth the same as Men.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    /// The board to evaluate.
    board: &'a Board,
}

impl<'a> Evaluator<'a> {
    #[inline(always)]
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    /// Evaluate this board from `side`'s perspective.
    ///
    /// A positive number is good for `side`, a negative number is better for the opponent.
    ///
    /// # Example
    /// ```
    /// # use draughts::{Board, Evaluator, Side, Square};
    /// let mut board = Board::default();
    /// board.take(Square::new(3, 1));
    /// assert_eq!(Evaluator::new(&board).eval_for(Side::North), 1);
    /// assert_eq!(Evaluator::new(&board).eval_for(Side::South), -1);
    /// ```
    #[inline(always)]
    pub fn eval_for(&self, side: Side) -> Score {
        Score(self.material(side) - self.material(side.opponent()))
    }

    /// Material held by `side`.
    #[inline(always)]
    fn material(&self, side: Side) -> i32 {
        self.board.count(side) as i32
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for side in Side::all() {
            writeln!(
                f,
                "{side:>5}: {} pieces ({} kings)",
                self.material(side),
                self.board.count_kings(side)
            )?;
        }
        write!(f, "Score (north): {}", self.eval_for(Side::North))
    }
}
