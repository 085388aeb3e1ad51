/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::path::PathBuf;

use clap::{builder::PossibleValue, Parser, Subcommand, ValueEnum};

use crate::{Side, Square};

/// Command-line arguments of the `draughts` binary.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// What the binary should do.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Play an interactive game against the computer.
    Play {
        /// How the computer chooses its moves.
        #[arg(short, long, default_value = "minimax")]
        strategy: StrategyKind,

        /// The side you play. South moves first.
        #[arg(long, default_value = "south")]
        human: Side,

        /// JSON config file. Defaults to the play preset.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Value table file, overriding the config.
        #[arg(short, long)]
        table: Option<PathBuf>,

        /// Search depth of the minimax opponent, overriding the config.
        #[arg(short, long)]
        depth: Option<usize>,

        /// Seed for the learning opponent, overriding the config.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Train the value table through self-play.
    Train {
        /// Number of episodes, overriding the config.
        #[arg(short, long)]
        episodes: Option<usize>,

        /// Number of worker threads.
        #[arg(short, long, default_value_t = 1)]
        workers: usize,

        /// JSON config file. Defaults to the training preset.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Value table file, overriding the config.
        #[arg(short, long)]
        table: Option<PathBuf>,

        /// Seed for reproducible runs, overriding the config.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Count the leaf positions reachable from the starting board.
    Perft {
        depth: usize,

        /// Length of one side of the board.
        #[arg(short, long, default_value_t = crate::DEFAULT_BOARD_SIZE)]
        size: u8,

        /// If set, the count is also broken down by root move.
        #[arg(long, default_value = "false")]
        split: bool,
    },
}

/// The computer's policy, as selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Minimax,
    QLearning,
}

impl ValueEnum for StrategyKind {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Minimax, Self::QLearning]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let value = match self {
            Self::Minimax => PossibleValue::new("minimax").aliases(["mm", "search"]),
            Self::QLearning => PossibleValue::new("qlearning").aliases(["q", "q-learning"]),
        };

        Some(value)
    }
}

impl ValueEnum for Side {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::North, Self::South]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let name = self.name();
        Some(PossibleValue::new(name).alias(&name[..1]))
    }
}

/// A command typed during an interactive game.
#[derive(Debug, Clone, Parser)]
#[command(multicall = true, about, rename_all = "lower")]
pub enum EngineCommand {
    /// Print the current board.
    #[command(alias = "d")]
    Display,

    /// List the legal moves of the side to move.
    Moves,

    /// Move the piece on `from` to `to`, e.g. `move 3,1 2,2`.
    #[command(alias = "m")]
    Move { from: Square, to: Square },

    /// Print the material balance of the current board.
    Eval,

    /// Start a new game, keeping anything learned so far.
    New,

    /// Merge the learned value table to disk.
    Save,

    /// Save and quit.
    #[command(aliases = ["exit", "q"])]
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_commands() {
        let cmd = EngineCommand::try_parse_from("move 3,1 2,2".split_ascii_whitespace()).unwrap();
        let EngineCommand::Move { from, to } = cmd else {
            panic!("expected a move");
        };
        assert_eq!(from, Square::new(3, 1));
        assert_eq!(to, Square::new(2, 2));

        assert!(matches!(
            EngineCommand::try_parse_from(["d"]).unwrap(),
            EngineCommand::Display
        ));
        assert!(matches!(
            EngineCommand::try_parse_from(["exit"]).unwrap(),
            EngineCommand::Quit
        ));
        assert!(EngineCommand::try_parse_from(["move", "3,1"]).is_err());
        assert!(EngineCommand::try_parse_from(["castle"]).is_err());
    }

    #[test]
    fn test_parse_cli() {
        let cli = Cli::try_parse_from(["draughts", "play", "--strategy", "q", "--human", "n"]).unwrap();
        let Command::Play { strategy, human, .. } = cli.command else {
            panic!("expected play");
        };
        assert_eq!(strategy, StrategyKind::QLearning);
        assert_eq!(human, Side::North);

        let cli = Cli::try_parse_from(["draughts", "train", "-e", "50", "-w", "4"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Train {
                episodes: Some(50),
                workers: 4,
                ..
            }
        ));
    }
}
