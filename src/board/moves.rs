/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::Square;

/// A list of moves available to one side.
pub type MoveList = Vec<Move>;

/// A single-step move: either a simple diagonal step, or a jump over one enemy piece.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    /// Square the moving piece starts on.
    pub from: Square,

    /// Square the moving piece ends on. For captures, this is the landing square.
    pub to: Square,

    /// Square of the enemy piece removed by this move, if it is a capture.
    pub captured: Option<Square>,

    /// Whether the moving piece is a Man that becomes a King on `to`.
    pub promotes: bool,
}

impl Move {
    /// Creates a simple (non-capturing) move.
    #[inline(always)]
    pub const fn quiet(from: Square, to: Square, promotes: bool) -> Self {
        Self {
            from,
            to,
            captured: None,
            promotes,
        }
    }

    /// Creates a move that jumps from `from` over `captured` and lands on `to`.
    #[inline(always)]
    pub const fn capture(from: Square, captured: Square, to: Square, promotes: bool) -> Self {
        Self {
            from,
            to,
            captured: Some(captured),
            promotes,
        }
    }

    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.promotes
    }
}

impl fmt::Display for Move {
    /// Simple moves are written `from-to`, captures `fromxto`, and promotions gain a trailing `=K`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture() { 'x' } else { '-' };
        write!(f, "{}{sep}{}", self.from, self.to)?;
        if self.promotes {
            write!(f, "=K")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_display() {
        let quiet = Move::quiet(Square::new(0, 0), Square::new(1, 1), false);
        assert_eq!(quiet.to_string(), "0,0-1,1");

        let capture = Move::capture(Square::new(1, 1), Square::new(2, 2), Square::new(3, 3), true);
        assert_eq!(capture.to_string(), "1,1x3,3=K");
        assert!(capture.is_capture());
        assert!(!quiet.is_capture());
    }
}
