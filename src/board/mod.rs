/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Legal move generation, with mandatory captures and promotion.
mod movegen;

/// The [`Move`] type.
mod moves;

/// Performance testing for move generation.
mod perft;

/// Sides and pieces.
mod piece;

/// The [`Board`] value type.
mod position;

/// Squares and diagonal directions.
mod square;

pub use movegen::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use square::*;
