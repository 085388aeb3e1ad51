/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::Direction;

/// One of the two teams on the board.
///
/// [`Side::North`] starts on the low rows (drawn at the top) and advances toward increasing row.
/// [`Side::South`] starts on the high rows and advances toward row `0`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    North,
    #[default]
    South,
}

impl Side {
    /// Number of sides.
    pub const COUNT: usize = 2;

    /// Both sides, North first.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::North, Self::South]
    }

    /// Returns this side's opponent.
    ///
    /// # Example
    /// ```
    /// # use draughts::Side;
    /// assert_eq!(Side::North.opponent(), Side::South);
    /// assert_eq!(Side::South.opponent(), Side::North);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
        }
    }

    /// Row delta of a single step toward this side's promotion row.
    #[inline(always)]
    pub const fn forward(&self) -> i8 {
        match self {
            Self::North => 1,
            Self::South => -1,
        }
    }

    /// The row on which a Man of this side becomes a King: the far rank from its starting rows.
    #[inline(always)]
    pub const fn promotion_row(&self, size: u8) -> u8 {
        match self {
            Self::North => size - 1,
            Self::South => 0,
        }
    }

    /// The diagonals a Man of this side may move and capture along.
    #[inline(always)]
    pub const fn forward_directions(&self) -> &'static [Direction] {
        match self {
            Self::North => &Direction::SOUTHWARD,
            Self::South => &Direction::NORTHWARD,
        }
    }

    /// The diagonals pointing behind this side's direction of travel.
    #[inline(always)]
    pub const fn backward_directions(&self) -> &'static [Direction] {
        self.opponent().forward_directions()
    }

    /// Lowercase name of this side.
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
        }
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Self::North),
            "south" | "s" => Ok(Self::South),
            _ => bail!("Invalid side {s:?}: expected \"north\" or \"south\""),
        }
    }
}

impl fmt::Display for Side {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// The rank of a piece.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum PieceKind {
    /// An unpromoted piece, restricted to its side's forward diagonals.
    #[default]
    Man,

    /// A promoted piece, free to move and capture along all four diagonals.
    King,
}

/// A piece on the board: a [`Side`] and a [`PieceKind`].
///
/// Pieces are plain values; promotion produces a new [`Piece`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Piece {
    side: Side,
    kind: PieceKind,
}

impl Piece {
    #[inline(always)]
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }

    /// Creates an unpromoted piece of `side`.
    #[inline(always)]
    pub const fn man(side: Side) -> Self {
        Self::new(side, PieceKind::Man)
    }

    /// Creates a King of `side`.
    #[inline(always)]
    pub const fn king(side: Side) -> Self {
        Self::new(side, PieceKind::King)
    }

    #[inline(always)]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline(always)]
    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    /// Returns a King-ranked copy of this piece.
    #[inline(always)]
    pub const fn promoted(&self) -> Self {
        Self::king(self.side)
    }

    /// The diagonals this piece may move and capture along.
    ///
    /// # Example
    /// ```
    /// # use draughts::{Direction, Piece, Side};
    /// assert_eq!(Piece::man(Side::North).directions(), &Direction::SOUTHWARD);
    /// assert_eq!(Piece::king(Side::North).directions(), &Direction::ALL);
    /// ```
    #[inline(always)]
    pub const fn directions(&self) -> &'static [Direction] {
        match self.kind {
            PieceKind::Man => self.side.forward_directions(),
            PieceKind::King => &Direction::ALL,
        }
    }

    /// Single-character form of this piece: the side's initial, uppercase for Kings.
    ///
    /// # Example
    /// ```
    /// # use draughts::{Piece, Side};
    /// assert_eq!(Piece::man(Side::North).char(), 'n');
    /// assert_eq!(Piece::king(Side::South).char(), 'S');
    /// ```
    #[inline(always)]
    pub const fn char(&self) -> char {
        match (self.side, self.kind) {
            (Side::North, PieceKind::Man) => 'n',
            (Side::North, PieceKind::King) => 'N',
            (Side::South, PieceKind::Man) => 's',
            (Side::South, PieceKind::King) => 'S',
        }
    }

    /// Parses a piece from its [`Piece::char`] form.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'n' => Ok(Self::man(Side::North)),
            'N' => Ok(Self::king(Side::North)),
            's' => Ok(Self::man(Side::South)),
            'S' => Ok(Self::king(Side::South)),
            _ => bail!("Invalid piece char {c:?}: expected one of n, N, s, S"),
        }
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => bail!("Invalid piece {s:?}: expected a single char"),
        }
    }
}

impl fmt::Display for Piece {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_rows() {
        assert_eq!(Side::North.promotion_row(4), 3);
        assert_eq!(Side::South.promotion_row(4), 0);
        assert_eq!(Side::North.promotion_row(8), 7);
    }

    #[test]
    fn test_backward_is_opposite_of_forward() {
        for side in Side::all() {
            for dir in side.backward_directions() {
                assert_eq!(dir.dr, -side.forward());
            }
            for dir in side.forward_directions() {
                assert_eq!(dir.dr, side.forward());
            }
        }
    }

    #[test]
    fn test_piece_chars() {
        for side in Side::all() {
            for piece in [Piece::man(side), Piece::king(side)] {
                assert_eq!(Piece::from_char(piece.char()).unwrap(), piece);
            }
        }
        assert!(Piece::from_char('x').is_err());
    }

    #[test]
    fn test_promoted_keeps_side() {
        let man = Piece::man(Side::South);
        let king = man.promoted();
        assert!(king.is_king());
        assert_eq!(king.side(), Side::South);
        assert!(!man.is_king());
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("North".parse::<Side>().unwrap(), Side::North);
        assert_eq!("s".parse::<Side>().unwrap(), Side::South);
        assert!("east".parse::<Side>().is_err());
    }
}
