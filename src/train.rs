/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::{outcome, AgentStep, Board, Config, GameOutcome, QAgent, Side, StateKey, TableStore};

/// Interval, in episodes, between progress logs.
const PROGRESS_INTERVAL: usize = 100;

/// One turn of a self-play episode.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnLog {
    /// Turn number, starting at `1`.
    pub turn: usize,

    /// Side that played this turn.
    pub side: Side,

    /// Board before the turn.
    pub state: StateKey,

    /// Board after the turn, or `None` if `side` had to pass.
    pub action: Option<StateKey>,
}

/// Everything that happened in one self-play episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    pub outcome: GameOutcome,
    pub turns: usize,
    pub log: Vec<TurnLog>,
}

/// Tally of finished episodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingStats {
    pub episodes: usize,
    pub north_wins: usize,
    pub south_wins: usize,
    pub draws: usize,
}

impl TrainingStats {
    /// Counts one finished episode.
    pub fn record(&mut self, outcome: GameOutcome) {
        self.episodes += 1;
        match outcome {
            GameOutcome::Winner(Side::North) => self.north_wins += 1,
            GameOutcome::Winner(Side::South) => self.south_wins += 1,
            GameOutcome::Draw => self.draws += 1,
        }
    }

    /// Adds the tallies of `other` to these.
    pub fn absorb(&mut self, other: Self) {
        self.episodes += other.episodes;
        self.north_wins += other.north_wins;
        self.south_wins += other.south_wins;
        self.draws += other.draws;
    }
}

impl fmt::Display for TrainingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} episodes: north {} / south {} / draws {}",
            self.episodes, self.north_wins, self.south_wins, self.draws
        )
    }
}

/// Trains a [`QAgent`] by having it play both sides against itself.
#[derive(Debug)]
pub struct Trainer {
    config: Config,
    start: Board,
    store: TableStore,
}

impl Trainer {
    pub fn new(config: Config, store: TableStore) -> Result<Self> {
        config.validate()?;
        let start = Board::new(config.board_size)?;

        Ok(Self {
            config,
            start,
            store,
        })
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline(always)]
    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Creates an agent over the stored table, seeded with the configured seed offset by `worker`.
    pub fn agent(&self, worker: usize) -> QAgent {
        let seed = self.config.seed.map(|seed| seed.wrapping_add(worker as u64));
        QAgent::new(self.store.load(), self.config.learning, seed)
    }

    /// Plays one game from the starting board, with `agent` moving for both sides and learning from every turn.
    ///
    /// When the game ends, one terminal update is written for the final board,
    /// rewarded from the perspective of the side that played the last turn.
    pub fn play_episode(&self, agent: &mut QAgent) -> EpisodeRecord {
        let Config {
            rewards,
            terminal,
            turn_ceiling,
            first_side,
            ..
        } = self.config;

        let mut board = self.start.clone();
        let mut side = first_side;
        let mut last_mover = first_side.opponent();
        let mut turns = 0;
        let mut log = Vec::new();

        let result = loop {
            if let Some(result) = outcome(&board, turns, turn_ceiling) {
                break result;
            }

            turns += 1;
            let (state, action) = match agent.act(&board, side, &rewards, terminal.no_moves) {
                AgentStep::Moved {
                    board: next,
                    state,
                    action,
                    ..
                } => {
                    board = next;
                    (state, Some(action))
                }
                AgentStep::Passed { state } => (state, None),
            };
            log.push(TurnLog {
                turn: turns,
                side,
                state,
                action,
            });

            last_mover = side;
            side = side.opponent();
        };

        let reward = match result {
            GameOutcome::Winner(winner) if winner == last_mover => Some(terminal.win),
            GameOutcome::Winner(_) => Some(terminal.loss),
            GameOutcome::Draw => terminal.update_on_draw.then_some(terminal.draw),
        };
        if let Some(reward) = reward {
            agent.record_terminal(&board, reward);
        }

        EpisodeRecord {
            outcome: result,
            turns,
            log,
        }
    }

    /// Trains a single agent for `episodes` episodes, merging its table into the store periodically and at the end.
    pub fn run(&self, episodes: usize) -> TrainingStats {
        let mut agent = self.agent(0);
        let stats = self.train(&mut agent, episodes, 0);
        tracing::info!(%stats, "training complete");
        stats
    }

    /// Splits `episodes` across `workers` agents, trained on a dedicated pool of `workers` threads.
    ///
    /// Each worker owns its own board and its own agent, whose table is loaded from the store when it starts.
    /// The store is the only thing workers share: each one merges only the values it updated.
    pub fn run_parallel(&self, episodes: usize, workers: usize) -> Result<TrainingStats> {
        let workers = workers.max(1);
        if workers == 1 {
            return Ok(self.run(episodes));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .context("Failed to build training thread pool")?;

        let per_worker = episodes / workers;
        let remainder = episodes % workers;

        let stats = pool.install(|| {
            (0..workers)
                .into_par_iter()
                .map(|worker| {
                    let episodes = per_worker + usize::from(worker < remainder);
                    let mut agent = self.agent(worker);
                    self.train(&mut agent, episodes, worker)
                })
                .reduce(TrainingStats::default, |mut total, stats| {
                    total.absorb(stats);
                    total
                })
        });

        tracing::info!(%stats, workers, "training complete");
        Ok(stats)
    }

    fn train(&self, agent: &mut QAgent, episodes: usize, worker: usize) -> TrainingStats {
        let mut stats = TrainingStats::default();
        let checkpoint_every = self.config.checkpoint_every;

        for episode in 1..=episodes {
            let record = self.play_episode(agent);
            stats.record(record.outcome);

            if episode % PROGRESS_INTERVAL == 0 {
                tracing::info!(worker, %stats, states = agent.table().len(), "training progress");
            }

            if checkpoint_every > 0 && episode % checkpoint_every == 0 && episode != episodes {
                self.checkpoint(agent);
            }
        }

        self.checkpoint(agent);
        stats
    }

    /// Merges the agent's pending updates into the store, logging rather than propagating a failure.
    fn checkpoint(&self, agent: &mut QAgent) {
        if let Err(err) = agent.save_to(&self.store) {
            tracing::warn!(%err, "failed to save value table; continuing without saving");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TERMINAL_ACTION;

    fn trainer(dir: &tempfile::TempDir) -> Trainer {
        let mut config = Config::training();
        config.seed = Some(11);
        config.checkpoint_every = 5;
        Trainer::new(config, TableStore::new(dir.path().join("q.json"))).unwrap()
    }

    #[test]
    fn test_episode_ends_with_terminal_update() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(&dir);
        let mut agent = trainer.agent(0);

        let record = trainer.play_episode(&mut agent);
        assert!(record.turns <= trainer.config().turn_ceiling);
        assert_eq!(record.log.len(), record.turns);
        assert_eq!(record.log[0].side, Side::South);
        assert_eq!(record.log[0].state, StateKey::new(&Board::default()));

        let last = record.log.last().unwrap();
        let final_state = last.action.clone().unwrap_or_else(|| last.state.clone());
        let terminal = agent.table().get(final_state.as_str(), TERMINAL_ACTION);
        match record.outcome {
            GameOutcome::Winner(_) => assert_eq!(terminal.abs(), 10.0),
            GameOutcome::Draw => assert_eq!(terminal, 0.0),
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();

        let first = trainer(&a).play_episode(&mut trainer(&a).agent(0));
        let second = trainer(&b).play_episode(&mut trainer(&b).agent(0));
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_tallies_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(&dir);

        let stats = trainer.run(12);
        assert_eq!(stats.episodes, 12);
        assert_eq!(stats.north_wins + stats.south_wins + stats.draws, 12);
        assert!(!trainer.store().load().is_empty());
    }

    #[test]
    fn test_parallel_splits_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(&dir);

        let stats = trainer.run_parallel(10, 3).unwrap();
        assert_eq!(stats.episodes, 10);
        assert_eq!(stats.north_wins + stats.south_wins + stats.draws, 10);
        assert!(!trainer.store().load().is_empty());
    }
}
