/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};

use crate::{Board, Direction, Side, Square};

/// Weights of each term of the shaping reward handed to the learning agent after a move.
///
/// Every weight is a magnitude; [`compute_reward`] applies the sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    /// Penalty per own piece lost.
    pub piece_lost: f64,

    /// Bonus per enemy piece captured.
    pub piece_captured: f64,

    /// Bonus per own piece promoted.
    pub promotion: f64,

    /// Flat penalty for a move that neither captures nor promotes.
    pub idle_penalty: f64,

    /// Bonus per own piece with a friendly neighbor on any diagonal.
    pub support: f64,

    /// Bonus per own piece with a friendly neighbor on a diagonal behind it.
    pub backward_support: f64,

    /// Second, separately weighted bonus for the same backward cover as [`Self::backward_support`].
    pub protection: f64,

    /// Bonus per own piece on one of the four center squares.
    pub center: f64,
}

impl RewardWeights {
    /// Weights used while playing against a human.
    pub const fn interactive() -> Self {
        Self {
            piece_lost: 5.0,
            piece_captured: 5.0,
            promotion: 3.0,
            idle_penalty: 0.1,
            support: 0.2,
            backward_support: 1.5,
            protection: 0.0,
            center: 0.1,
        }
    }

    /// Weights used for bulk self-play training.
    pub const fn self_play() -> Self {
        Self {
            piece_lost: 5.0,
            piece_captured: 5.0,
            promotion: 1.0,
            idle_penalty: 0.05,
            support: 0.2,
            backward_support: 1.5,
            protection: 0.5,
            center: 0.1,
        }
    }
}

impl Default for RewardWeights {
    #[inline(always)]
    fn default() -> Self {
        Self::interactive()
    }
}

/// Scores the move that turned `before` into `after`, from `side`'s perspective.
///
/// Material and promotion terms compare the two boards. Positional terms only look at `after`.
///
/// # Example
/// ```
/// # use draughts::{compute_reward, legal_successors, Board, RewardWeights, Side};
/// let before = Board::default();
/// let after = &legal_successors(&before, Side::South)[0];
///
/// // A quiet move onto the edge that leaves both pieces isolated
/// let reward = compute_reward(&before, after, Side::South, &RewardWeights::interactive());
/// assert!((reward + 0.1).abs() < 1e-9);
/// ```
pub fn compute_reward(before: &Board, after: &Board, side: Side, weights: &RewardWeights) -> f64 {
    let enemy = side.opponent();
    let mut reward = 0.0;

    let own_lost = before.count(side).saturating_sub(after.count(side));
    let enemy_lost = before.count(enemy).saturating_sub(after.count(enemy));
    let promoted = after
        .count_kings(side)
        .saturating_sub(before.count_kings(side));

    reward -= weights.piece_lost * own_lost as f64;
    reward += weights.piece_captured * enemy_lost as f64;
    reward += weights.promotion * promoted as f64;

    if enemy_lost == 0 && promoted == 0 {
        reward -= weights.idle_penalty;
    }

    reward += weights.support * supported(after, side) as f64;
    reward += weights.backward_support * covered(after, side) as f64;
    reward += weights.center * central(after, side) as f64;
    reward += weights.protection * covered(after, side) as f64;

    reward
}

/// Returns `true` if a piece of `side` sits one step from `square` in any of `dirs`.
fn has_friend(board: &Board, side: Side, square: Square, dirs: &[Direction]) -> bool {
    dirs.iter()
        .filter_map(|&dir| square.offset(dir, board.size()))
        .any(|neighbor| board.piece_at(neighbor).is_some_and(|p| p.side() == side))
}

/// Number of pieces of `side` with at least one friendly diagonal neighbor.
fn supported(board: &Board, side: Side) -> usize {
    board
        .pieces_of(side)
        .filter(|&(square, _)| has_friend(board, side, square, &Direction::ALL))
        .count()
}

/// Number of pieces of `side` that cannot be jumped from behind, because a friendly piece stands there.
fn covered(board: &Board, side: Side) -> usize {
    board
        .pieces_of(side)
        .filter(|&(square, _)| has_friend(board, side, square, side.backward_directions()))
        .count()
}

/// Number of pieces of `side` on the center squares.
fn central(board: &Board, side: Side) -> usize {
    let half = board.size() / 2;
    let is_center = |n: u8| n == half - 1 || n == half;

    board
        .pieces_of(side)
        .filter(|(square, _)| is_center(square.row()) && is_center(square.col()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Piece;

    fn board_with(pieces: &[(u8, u8, Piece)]) -> Board {
        Board::from_pieces(
            4,
            pieces
                .iter()
                .map(|&(row, col, piece)| (Square::new(row, col), piece)),
        )
        .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_compact_advance() {
        // South (3,1) -> (2,2): both pieces touch, (2,2) is covered from behind by (3,3), and (2,2) is central
        let before = Board::default();
        let after = board_with(&[
            (0, 0, Piece::man(Side::North)),
            (0, 2, Piece::man(Side::North)),
            (2, 2, Piece::man(Side::South)),
            (3, 3, Piece::man(Side::South)),
        ]);

        let interactive = compute_reward(&before, &after, Side::South, &RewardWeights::interactive());
        assert!(approx(interactive, 0.4 + 1.5 + 0.1 - 0.1), "got {interactive}");

        let self_play = compute_reward(&before, &after, Side::South, &RewardWeights::self_play());
        assert!(approx(self_play, 0.4 + 1.5 + 0.5 + 0.1 - 0.05), "got {self_play}");
    }

    #[test]
    fn test_capture_and_promotion() {
        let before = board_with(&[
            (1, 1, Piece::man(Side::North)),
            (2, 2, Piece::man(Side::South)),
        ]);
        let after = board_with(&[(3, 3, Piece::king(Side::North))]);

        // +5 capture, +3 promotion, no idle penalty
        let reward = compute_reward(&before, &after, Side::North, &RewardWeights::interactive());
        assert!(approx(reward, 8.0), "got {reward}");

        // The same transition is a loss for the captured side
        let reward = compute_reward(&before, &after, Side::South, &RewardWeights::interactive());
        assert!(approx(reward, -5.0 - 0.1), "got {reward}");
    }

    #[test]
    fn test_backward_is_relative_to_side() {
        // North advances toward increasing row, so its cover sits on the row above
        let board = board_with(&[
            (0, 0, Piece::man(Side::North)),
            (1, 1, Piece::man(Side::North)),
        ]);
        assert_eq!(covered(&board, Side::North), 1);
        assert_eq!(supported(&board, Side::North), 2);

        let board = board_with(&[
            (0, 0, Piece::man(Side::South)),
            (1, 1, Piece::man(Side::South)),
        ]);
        assert_eq!(covered(&board, Side::South), 1);
    }

    #[test]
    fn test_center_squares() {
        let board = Board::new(8).unwrap();
        assert_eq!(central(&board, Side::North), 0);

        let board = Board::from_pieces(
            8,
            [
                (Square::new(3, 3), Piece::man(Side::North)),
                (Square::new(4, 4), Piece::man(Side::North)),
                (Square::new(2, 2), Piece::man(Side::North)),
            ],
        )
        .unwrap();
        assert_eq!(central(&board, Side::North), 2);
    }
}
