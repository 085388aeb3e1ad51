/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{collections::BTreeMap, fmt};

use anyhow::{bail, Result};

use super::{is_valid_board_size, Piece, Side, Square, MAX_BOARD_SIZE, MIN_BOARD_SIZE};

/// Default board size.
pub const DEFAULT_BOARD_SIZE: u8 = 4;

/// The placement of every piece on an `N x N` board.
///
/// A [`Board`] is a value: cloning it yields a fully independent copy,
/// and every successor produced by move generation is freshly constructed.
///
/// Invariants upheld by every constructor:
/// * every occupied square is a dark square on the board
/// * a square holds at most one piece
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Length of one side of the board.
    size: u8,

    /// Occupied squares. Ordered, so iteration is stable across runs.
    pieces: BTreeMap<Square, Piece>,
}

impl Board {
    /// Creates the starting setup for a `size x size` board.
    ///
    /// North fills the dark squares of its first `size / 2 - 1` rows, and South the last `size / 2 - 1` rows.
    ///
    /// # Example
    /// ```
    /// # use draughts::{Board, Piece, Side, Square};
    /// let board = Board::new(4).unwrap();
    /// assert_eq!(board.piece_at(Square::new(0, 0)), Some(Piece::man(Side::North)));
    /// assert_eq!(board.piece_at(Square::new(0, 2)), Some(Piece::man(Side::North)));
    /// assert_eq!(board.piece_at(Square::new(3, 1)), Some(Piece::man(Side::South)));
    /// assert_eq!(board.piece_at(Square::new(3, 3)), Some(Piece::man(Side::South)));
    /// assert_eq!(board.total(), 4);
    /// ```
    pub fn new(size: u8) -> Result<Self> {
        let mut board = Self::empty(size)?;
        let rows = size / 2 - 1;

        for square in Square::dark_squares(size) {
            if square.row() < rows {
                board.pieces.insert(square, Piece::man(Side::North));
            } else if square.row() >= size - rows {
                board.pieces.insert(square, Piece::man(Side::South));
            }
        }

        Ok(board)
    }

    /// Creates a board of `size x size` squares with no pieces on it.
    pub fn empty(size: u8) -> Result<Self> {
        if !is_valid_board_size(size) {
            bail!("Invalid board size {size}: must be even and within [{MIN_BOARD_SIZE}, {MAX_BOARD_SIZE}]");
        }

        Ok(Self {
            size,
            pieces: BTreeMap::new(),
        })
    }

    /// Creates a board of `size x size` squares holding the provided pieces.
    ///
    /// Fails if any piece is placed on a light square, off the board, or on an already-occupied square.
    pub fn from_pieces(size: u8, pieces: impl IntoIterator<Item = (Square, Piece)>) -> Result<Self> {
        let mut board = Self::empty(size)?;

        for (square, piece) in pieces {
            if board.is_occupied(square) {
                bail!("Cannot place {piece} on {square}: square is already occupied");
            }
            board.place(square, piece)?;
        }

        Ok(board)
    }

    /// Length of one side of the board.
    #[inline(always)]
    pub const fn size(&self) -> u8 {
        self.size
    }

    /// Places `piece` on `square`, replacing whatever was there.
    ///
    /// Fails if `square` is off the board or is a light square.
    pub fn place(&mut self, square: Square, piece: Piece) -> Result<()> {
        if !square.is_on_board(self.size) {
            bail!(
                "Cannot place {piece} on {square}: square is off a {size}x{size} board",
                size = self.size
            );
        }
        if !square.is_dark() {
            bail!("Cannot place {piece} on {square}: pieces may only occupy dark squares");
        }

        self.pieces.insert(square, piece);
        Ok(())
    }

    /// Removes and returns the piece on `square`, if there is one.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.pieces.remove(&square)
    }

    /// Fetches the piece on `square`, if there is one.
    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pieces.get(&square).copied()
    }

    /// Returns `true` if a piece sits on `square`.
    #[inline(always)]
    pub fn is_occupied(&self, square: Square) -> bool {
        self.pieces.contains_key(&square)
    }

    /// Returns `true` if `square` is a dark square on this board that holds no piece.
    #[inline(always)]
    pub fn is_vacant(&self, square: Square) -> bool {
        square.is_on_board(self.size) && square.is_dark() && !self.is_occupied(square)
    }

    /// Iterates over all occupied squares in row-major order.
    #[inline(always)]
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces.iter().map(|(&square, &piece)| (square, piece))
    }

    /// Iterates over the squares occupied by `side`, in row-major order.
    #[inline(always)]
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.side() == side)
    }

    /// Number of pieces `side` has on the board.
    #[inline(always)]
    pub fn count(&self, side: Side) -> usize {
        self.pieces_of(side).count()
    }

    /// Number of Kings `side` has on the board.
    #[inline(always)]
    pub fn count_kings(&self, side: Side) -> usize {
        self.pieces_of(side).filter(|(_, piece)| piece.is_king()).count()
    }

    /// Total number of pieces on the board.
    #[inline(always)]
    pub fn total(&self) -> usize {
        self.pieces.len()
    }

    /// Returns a King-ranked copy of `piece` if it is a Man landing on its side's promotion row, otherwise `piece` unchanged.
    ///
    /// # Example
    /// ```
    /// # use draughts::{Board, Piece, Side, Square};
    /// let board = Board::new(4).unwrap();
    /// let man = Piece::man(Side::South);
    /// assert!(board.promote(Square::new(0, 2), man).is_king());
    /// assert!(!board.promote(Square::new(1, 1), man).is_king());
    /// assert!(board.promote(Square::new(3, 3), Piece::man(Side::North)).is_king());
    /// ```
    #[inline(always)]
    pub fn promote(&self, square: Square, piece: Piece) -> Piece {
        if !piece.is_king() && square.row() == piece.side().promotion_row(self.size) {
            piece.promoted()
        } else {
            piece
        }
    }

    /// Inserts a piece without validating the square.
    ///
    /// Only called with squares produced by bounds-checked move generation.
    #[inline(always)]
    pub(crate) fn insert_unchecked(&mut self, square: Square, piece: Piece) {
        debug_assert!(square.is_on_board(self.size) && square.is_dark());
        self.pieces.insert(square, piece);
    }
}

impl Default for Board {
    /// The 4x4 starting setup.
    #[inline(always)]
    fn default() -> Self {
        let mut board = Self {
            size: DEFAULT_BOARD_SIZE,
            pieces: BTreeMap::new(),
        };
        for (square, side) in [
            (Square::new(0, 0), Side::North),
            (Square::new(0, 2), Side::North),
            (Square::new(3, 1), Side::South),
            (Square::new(3, 3), Side::South),
        ] {
            board.insert_unchecked(square, Piece::man(side));
        }
        board
    }
}

impl fmt::Display for Board {
    /// Draws the board with row `0` at the top.
    ///
    /// Empty dark squares are drawn as `.` and light squares are left blank.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            write!(f, "{row} |")?;
            for col in 0..self.size {
                let square = Square::new(row, col);
                let c = match self.piece_at(square) {
                    Some(piece) => piece.char(),
                    None if square.is_dark() => '.',
                    None => ' ',
                };
                write!(f, " {c}")?;
            }

            if row == 0 {
                write!(f, "    North: {}", self.count(Side::North))?;
            } else if row == 1 {
                write!(f, "    South: {}", self.count(Side::South))?;
            }
            writeln!(f)?;
        }

        write!(f, "  +")?;
        for _ in 0..self.size {
            write!(f, "--")?;
        }
        writeln!(f)?;

        write!(f, "   ")?;
        for col in 0..self.size {
            write!(f, " {col}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.pieces.iter()).finish()
    }
}
