/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};

/// Smallest board size the engine can play on.
pub const MIN_BOARD_SIZE: u8 = 4;

/// Largest board size the engine can play on.
///
/// Keeping rows and columns to a single digit keeps the string form of a [`Square`] sortable.
pub const MAX_BOARD_SIZE: u8 = 10;

/// Returns `true` if `size` is a playable board size: even, and within [`MIN_BOARD_SIZE`] and [`MAX_BOARD_SIZE`].
#[inline(always)]
pub const fn is_valid_board_size(size: u8) -> bool {
    size % 2 == 0 && size >= MIN_BOARD_SIZE && size <= MAX_BOARD_SIZE
}

/// A single diagonal step across the board, expressed as a change in row and column.
///
/// Row `0` is drawn at the top of the board, so "north" means decreasing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    /// Change in row.
    pub dr: i8,

    /// Change in column.
    pub dc: i8,
}

impl Direction {
    pub const NORTH_WEST: Self = Self::new(-1, -1);
    pub const NORTH_EAST: Self = Self::new(-1, 1);
    pub const SOUTH_WEST: Self = Self::new(1, -1);
    pub const SOUTH_EAST: Self = Self::new(1, 1);

    /// All four diagonals, in the order they are evaluated during move generation.
    pub const ALL: [Self; 4] = [
        Self::NORTH_WEST,
        Self::NORTH_EAST,
        Self::SOUTH_WEST,
        Self::SOUTH_EAST,
    ];

    /// The two diagonals that decrease the row.
    pub const NORTHWARD: [Self; 2] = [Self::NORTH_WEST, Self::NORTH_EAST];

    /// The two diagonals that increase the row.
    pub const SOUTHWARD: [Self; 2] = [Self::SOUTH_WEST, Self::SOUTH_EAST];

    #[inline(always)]
    const fn new(dr: i8, dc: i8) -> Self {
        Self { dr, dc }
    }
}

/// A square on an `N x N` board, addressed by `(row, col)`.
///
/// Only dark squares (where `row + col` is even) can hold pieces.
/// Squares order by row first, then column, which is also the order pieces are visited during move generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Creates a new [`Square`]. No bounds checks are performed, as the board size is not known here.
    #[inline(always)]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    #[inline(always)]
    pub const fn row(&self) -> u8 {
        self.row
    }

    #[inline(always)]
    pub const fn col(&self) -> u8 {
        self.col
    }

    /// Returns `true` if this is a dark (playable) square.
    ///
    /// # Example
    /// ```
    /// # use draughts::Square;
    /// assert!(Square::new(0, 0).is_dark());
    /// assert!(Square::new(3, 1).is_dark());
    /// assert!(!Square::new(1, 2).is_dark());
    /// ```
    #[inline(always)]
    pub const fn is_dark(&self) -> bool {
        (self.row + self.col) % 2 == 0
    }

    /// Returns `true` if this square lies on a board of `size x size` squares.
    #[inline(always)]
    pub const fn is_on_board(&self, size: u8) -> bool {
        self.row < size && self.col < size
    }

    /// Steps one square in `dir`, returning `None` if that would leave a board of `size x size` squares.
    ///
    /// # Example
    /// ```
    /// # use draughts::{Direction, Square};
    /// let sq = Square::new(0, 0);
    /// assert_eq!(sq.offset(Direction::SOUTH_EAST, 4), Some(Square::new(1, 1)));
    /// assert_eq!(sq.offset(Direction::NORTH_EAST, 4), None);
    /// assert_eq!(Square::new(3, 3).offset(Direction::SOUTH_EAST, 4), None);
    /// ```
    #[inline(always)]
    pub fn offset(&self, dir: Direction, size: u8) -> Option<Self> {
        let row = self.row.checked_add_signed(dir.dr)?;
        let col = self.col.checked_add_signed(dir.dc)?;
        let square = Self::new(row, col);
        square.is_on_board(size).then_some(square)
    }

    /// Iterates over every square of a `size x size` board in row-major order.
    pub fn iter(size: u8) -> impl Iterator<Item = Self> {
        (0..size).flat_map(move |row| (0..size).map(move |col| Self::new(row, col)))
    }

    /// Iterates over the dark squares of a `size x size` board in row-major order.
    pub fn dark_squares(size: u8) -> impl Iterator<Item = Self> {
        Self::iter(size).filter(Self::is_dark)
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;

    /// Parses a square from `"row,col"`. Surrounding parentheses and whitespace are ignored, so `"(2, 0)"` also works.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');

        let Some((row, col)) = trimmed.split_once(',') else {
            bail!("Invalid square {s:?}: expected the form \"row,col\"");
        };

        let row = row
            .trim()
            .parse::<u8>()
            .with_context(|| format!("Invalid row in square {s:?}"))?;
        let col = col
            .trim()
            .parse::<u8>()
            .with_context(|| format!("Invalid column in square {s:?}"))?;

        Ok(Self::new(row, col))
    }
}

impl fmt::Display for Square {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl fmt::Debug for Square {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_parsing() {
        assert_eq!("2,0".parse::<Square>().unwrap(), Square::new(2, 0));
        assert_eq!("(3, 1)".parse::<Square>().unwrap(), Square::new(3, 1));
        assert!("3".parse::<Square>().is_err());
        assert!("a,1".parse::<Square>().is_err());
        assert!("-1,0".parse::<Square>().is_err());
    }

    #[test]
    fn test_square_display_roundtrip() {
        for square in Square::iter(6) {
            assert_eq!(square.to_string().parse::<Square>().unwrap(), square);
        }
    }

    #[test]
    fn test_offset_is_bounds_checked() {
        let corner = Square::new(3, 0);
        let reachable = Direction::ALL
            .into_iter()
            .filter_map(|dir| corner.offset(dir, 4))
            .collect::<Vec<_>>();

        assert_eq!(reachable, vec![Square::new(2, 1)]);
    }

    #[test]
    fn test_dark_squares() {
        let dark = Square::dark_squares(4).collect::<Vec<_>>();
        assert_eq!(dark.len(), 8);
        assert!(dark.iter().all(Square::is_dark));
        assert_eq!(dark[0], Square::new(0, 0));
        assert_eq!(dark[1], Square::new(0, 2));
    }

    #[test]
    fn test_board_sizes() {
        assert!(is_valid_board_size(4));
        assert!(is_valid_board_size(8));
        assert!(!is_valid_board_size(5));
        assert!(!is_valid_board_size(2));
        assert!(!is_valid_board_size(12));
    }
}
