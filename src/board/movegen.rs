/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Board, Move, MoveList, Side, Square};

/// Generates every legal move for `side` on `board`.
///
/// Pieces are visited in row-major order, and each piece's directions in the order
/// north-west, north-east, south-west, south-east (restricted to the piece's direction set).
///
/// Captures are mandatory: if any piece of `side` can capture, only captures are returned.
/// This choice is made across all pieces at once, not per piece.
/// Each move performs at most one capture; jump chains are not generated.
///
/// # Example
/// ```
/// # use draughts::{generate_moves, Board, Side};
/// let board = Board::default();
/// assert_eq!(generate_moves(&board, Side::South).len(), 3);
/// assert_eq!(generate_moves(&board, Side::North).len(), 3);
/// ```
pub fn generate_moves(board: &Board, side: Side) -> MoveList {
    let size = board.size();
    let mut quiets = MoveList::new();
    let mut captures = MoveList::new();

    for (from, piece) in board.pieces_of(side) {
        for &dir in piece.directions() {
            // Bounds-checked, so pieces on an edge simply evaluate fewer directions
            let Some(to) = from.offset(dir, size) else {
                continue;
            };

            match board.piece_at(to) {
                None => {
                    let promotes = board.promote(to, piece) != piece;
                    quiets.push(Move::quiet(from, to, promotes));
                }

                Some(other) if other.side() != side => {
                    // The landing square must be on the board and empty
                    let Some(landing) = to.offset(dir, size) else {
                        continue;
                    };
                    if board.is_vacant(landing) {
                        let promotes = board.promote(landing, piece) != piece;
                        captures.push(Move::capture(from, to, landing, promotes));
                    }
                }

                // Blocked by a friendly piece
                Some(_) => {}
            }
        }
    }

    if captures.is_empty() {
        quiets
    } else {
        captures
    }
}

/// Returns every board reachable by `side` in one legal move, in generation order.
///
/// Empty only if `side` has no movable piece.
#[inline(always)]
pub fn legal_successors(board: &Board, side: Side) -> Vec<Board> {
    generate_moves(board, side)
        .into_iter()
        .map(|mv| board.with_move_made(mv))
        .collect()
}

/// Finds the legal move of `side` that takes the piece on `from` to `to`, if there is one.
///
/// This is how externally-supplied move intents are validated: anything not in the legal set is rejected.
#[inline(always)]
pub fn find_move(board: &Board, side: Side, from: Square, to: Square) -> Option<Move> {
    generate_moves(board, side)
        .into_iter()
        .find(|mv| mv.from == from && mv.to == to)
}

impl Board {
    /// Copies `self` and returns the [`Board`] after having applied the provided [`Move`].
    ///
    /// The moving piece is promoted exactly once, based on its destination square.
    /// `mv` is expected to come from [`generate_moves`] on this board; if `from` is empty, the copy is returned unchanged.
    pub fn with_move_made(&self, mv: Move) -> Self {
        debug_assert!(
            self.is_occupied(mv.from),
            "Attempted to make move {mv} from an empty square"
        );
        let mut copied = self.clone();

        let Some(piece) = copied.take(mv.from) else {
            return copied;
        };

        if let Some(captured) = mv.captured {
            copied.take(captured);
        }

        let piece = copied.promote(mv.to, piece);
        copied.insert_unchecked(mv.to, piece);
        copied
    }

    /// Returns `true` if `side` has at least one legal move.
    #[inline(always)]
    pub fn has_moves(&self, side: Side) -> bool {
        !generate_moves(self, side).is_empty()
    }
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

    #[test]
    fn test_start_position_moves() {
        let board = Board::default();
        let moves = generate_moves(&board, Side::South)
            .into_iter()
            .map(|mv| mv.to_string())
            .collect::<Vec<_>>();

        assert_eq!(moves, vec!["3,1-2,0", "3,1-2,2", "3,3-2,2"]);
    }

    #[test]
    fn test_capture_is_mandatory_across_pieces() {
        // North at (1,1) can jump (2,2); North at (0,2) only has a quiet move to (1,3)
        let board = board_with(&[
            (0, 2, Piece::man(Side::North)),
            (1, 1, Piece::man(Side::North)),
            (2, 2, Piece::man(Side::South)),
        ]);

        let moves = generate_moves(&board, Side::North);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].is_capture());
        assert_eq!(moves[0].from, Square::new(1, 1));
        assert_eq!(moves[0].to, Square::new(3, 3));
        assert_eq!(moves[0].captured, Some(Square::new(2, 2)));
    }

    #[test]
    fn test_capture_blocked_by_occupied_landing() {
        let board = board_with(&[
            (1, 1, Piece::man(Side::North)),
            (2, 2, Piece::man(Side::South)),
            (3, 3, Piece::man(Side::South)),
        ]);

        let moves = generate_moves(&board, Side::North);
        assert!(moves.iter().all(|mv| !mv.is_capture()));
        assert_eq!(moves, vec![Move::quiet(Square::new(1, 1), Square::new(2, 0), false)]);
    }

    #[test]
    fn test_capture_off_board_landing() {
        // The jump from (2,2) over (3,1) would land on (4,0), which is off the board
        let board = board_with(&[
            (2, 2, Piece::man(Side::North)),
            (3, 1, Piece::man(Side::South)),
        ]);

        let moves = generate_moves(&board, Side::North);
        assert!(moves.iter().all(|mv| !mv.is_capture()));
        assert_eq!(moves, vec![Move::quiet(Square::new(2, 2), Square::new(3, 3), true)]);
    }

    #[test]
    fn test_men_cannot_move_backwards_but_kings_can() {
        let man = board_with(&[(1, 1, Piece::man(Side::South))]);
        let king = board_with(&[(1, 1, Piece::king(Side::South))]);

        assert_eq!(generate_moves(&man, Side::South).len(), 2);
        assert_eq!(generate_moves(&king, Side::South).len(), 4);
    }

    #[test]
    fn test_promotion_on_capture() {
        let board = board_with(&[
            (1, 1, Piece::man(Side::North)),
            (2, 2, Piece::man(Side::South)),
        ]);

        let successors = legal_successors(&board, Side::North);
        assert_eq!(successors.len(), 1);

        let after = &successors[0];
        assert_eq!(after.piece_at(Square::new(3, 3)), Some(Piece::king(Side::North)));
        assert_eq!(after.count(Side::South), 0);
        assert_eq!(after.total(), board.total() - 1);
    }

    #[test]
    fn test_successors_do_not_alias_parent() {
        let board = Board::default();
        let successors = legal_successors(&board, Side::South);
        assert_eq!(board, Board::default());
        assert!(successors.iter().all(|b| *b != board));
    }

    #[test]
    fn test_find_move() {
        let board = Board::default();
        assert!(find_move(&board, Side::North, Square::new(0, 0), Square::new(1, 1)).is_some());
        assert!(find_move(&board, Side::North, Square::new(0, 0), Square::new(2, 2)).is_none());
        assert!(find_move(&board, Side::South, Square::new(0, 0), Square::new(1, 1)).is_none());
    }
}
