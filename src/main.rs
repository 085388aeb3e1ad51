/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{path::PathBuf, process::ExitCode, time::Instant};

use anyhow::Result;
use clap::Parser;
use draughts::{
    perft, splitperft, Board, Cli, Command, Config, Engine, Game, QAgent, Strategy, StrategyKind,
    TableStore, Trainer,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Logs go to stderr, so stdout only carries the game itself
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli.command) {
        eprintln!("{} encountered an error: {e:#}", env!("CARGO_PKG_NAME"));
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Loads the config at `path`, or falls back to `preset`.
fn load_config(path: Option<PathBuf>, preset: Config) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(preset),
    }
}

fn execute(command: Command) -> Result<()> {
    match command {
        Command::Play {
            strategy,
            human,
            config,
            table,
            depth,
            seed,
        } => {
            let mut config = load_config(config, Config::play())?;
            if let Some(table) = table {
                config.table_path = table;
            }
            if let Some(depth) = depth {
                config.search.depth = depth;
            }
            if seed.is_some() {
                config.seed = seed;
            }

            let (strategy, store) = match strategy {
                StrategyKind::Minimax => (Strategy::Minimax(config.search), None),
                StrategyKind::QLearning => {
                    let store = TableStore::new(config.table_path.clone());
                    let agent = QAgent::new(store.load(), config.learning, config.seed);
                    (Strategy::QLearning(Box::new(agent)), Some(store))
                }
            };

            let game = Game::new(config, strategy, human.opponent(), store)?;
            Engine::new(game).run()
        }

        Command::Train {
            episodes,
            workers,
            config,
            table,
            seed,
        } => {
            let mut config = load_config(config, Config::training())?;
            if let Some(table) = table {
                config.table_path = table;
            }
            if let Some(episodes) = episodes {
                config.episodes = episodes;
            }
            if seed.is_some() {
                config.seed = seed;
            }

            let episodes = config.episodes;
            let store = TableStore::new(config.table_path.clone());
            let trainer = Trainer::new(config, store)?;

            let start = Instant::now();
            let stats = trainer.run_parallel(episodes, workers)?;
            println!("{stats} in {:.2?}", start.elapsed());
            Ok(())
        }

        Command::Perft { depth, size, split } => {
            let board = Board::new(size)?;
            let side = Config::default().first_side;

            let start = Instant::now();
            let nodes = if split {
                splitperft(&board, side, depth)
            } else {
                perft(&board, side, depth)
            };
            println!("{nodes} nodes in {:.2?}", start.elapsed());
            Ok(())
        }
    }
}
