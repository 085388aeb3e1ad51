/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// The Q-learning player.
mod agent;

/// The board, its pieces, and move generation.
mod board;

/// Command-line and interactive command parsing.
mod cli;

/// Settings and presets for games and training runs.
mod config;

/// Code related to the interactive front-end, such as user input handling.
mod engine;

/// Evaluation of positions.
mod eval;

/// A single game against the computer.
mod game;

/// Shaping rewards for the learning agent.
mod reward;

/// Type for representing evaluations.
mod score;

/// Minimax search with alpha-beta pruning.
mod search;

/// Value tables and their on-disk store.
mod table;

/// Self-play training.
mod train;

pub use agent::*;
pub use board::*;
pub use cli::*;
pub use config::*;
pub use engine::*;
pub use eval::*;
pub use game::*;
pub use reward::*;
pub use score::*;
pub use search::*;
pub use table::*;
pub use train::*;
