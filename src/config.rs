/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    is_valid_board_size, LearningParams, RewardWeights, SearchConfig, Side, TerminalRewards,
    DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE,
};

/// Default location of the persisted value table.
pub const DEFAULT_TABLE_PATH: &str = "qtable.json";

/// Every tunable of a game or a training run.
///
/// Loaded from JSON. Missing fields take their value from [`Config::play`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length of one side of the board.
    pub board_size: u8,

    /// Settings of the minimax opponent.
    pub search: SearchConfig,

    /// Settings of the Q-learning agent.
    pub learning: LearningParams,

    /// Weights of the shaping reward.
    pub rewards: RewardWeights,

    /// Rewards written at the end of a game.
    pub terminal: TerminalRewards,

    /// Number of turns after which a game is drawn.
    pub turn_ceiling: usize,

    /// Number of self-play episodes in a training run.
    pub episodes: usize,

    /// Merge the table to disk every this many episodes; `0` saves only at the end of the run.
    pub checkpoint_every: usize,

    /// Merge the table to disk after every AI move of an interactive game.
    pub checkpoint_every_move: bool,

    /// Location of the persisted value table.
    pub table_path: PathBuf,

    /// Seed for every random choice; unseeded runs draw from OS entropy.
    pub seed: Option<u64>,

    /// Side that moves first.
    pub first_side: Side,
}

impl Config {
    /// Settings for playing against a human.
    pub fn play() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            search: SearchConfig::default(),
            learning: LearningParams {
                epsilon: 0.2,
                ..Default::default()
            },
            rewards: RewardWeights::interactive(),
            terminal: TerminalRewards::play(),
            turn_ceiling: 64,
            episodes: 0,
            checkpoint_every: 0,
            checkpoint_every_move: true,
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            seed: None,
            first_side: Side::South,
        }
    }

    /// Settings for bulk self-play training.
    pub fn training() -> Self {
        Self {
            learning: LearningParams {
                epsilon: 0.8,
                ..Default::default()
            },
            rewards: RewardWeights::self_play(),
            terminal: TerminalRewards::training(),
            turn_ceiling: 100,
            episodes: 7000,
            checkpoint_every: 1000,
            checkpoint_every_move: false,
            ..Self::play()
        }
    }

    /// Loads a config from the JSON file at `path` and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks that every setting is within its allowed range.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_board_size(self.board_size) {
            bail!(
                "Invalid board_size {}: must be even and within [{MIN_BOARD_SIZE}, {MAX_BOARD_SIZE}]",
                self.board_size
            );
        }

        let LearningParams {
            alpha,
            gamma,
            epsilon,
        } = self.learning;
        if !(alpha > 0.0 && alpha <= 1.0) {
            bail!("Invalid learning rate {alpha}: must be within (0, 1]");
        }
        if !(0.0..=1.0).contains(&gamma) {
            bail!("Invalid discount {gamma}: must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&epsilon) {
            bail!("Invalid exploration rate {epsilon}: must be within [0, 1]");
        }

        if self.turn_ceiling == 0 {
            bail!("Invalid turn_ceiling 0: games must be allowed at least one turn");
        }

        Ok(())
    }
}

impl Default for Config {
    #[inline(always)]
    fn default() -> Self {
        Self::play()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let play = Config::play();
        assert_eq!(play.learning.epsilon, 0.2);
        assert_eq!(play.turn_ceiling, 64);
        assert_eq!(play.search.depth, 3);
        assert!(play.validate().is_ok());

        let training = Config::training();
        assert_eq!(training.learning.epsilon, 0.8);
        assert_eq!(training.learning.alpha, 0.5);
        assert_eq!(training.learning.gamma, 0.9);
        assert_eq!(training.turn_ceiling, 100);
        assert_eq!(training.episodes, 7000);
        assert!(training.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "board_size": 6, "learning": { "epsilon": 0.0 } }"#).unwrap();
        assert_eq!(config.board_size, 6);
        assert_eq!(config.learning.epsilon, 0.0);
        assert_eq!(config.learning.alpha, 0.5);
        assert_eq!(config.turn_ceiling, 64);
        assert_eq!(config.first_side, Side::South);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::play();
        config.board_size = 5;
        assert!(config.validate().is_err());

        let mut config = Config::play();
        config.learning.epsilon = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::play();
        config.learning.alpha = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::play();
        config.turn_ceiling = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, serde_json::to_string(&Config::training()).unwrap()).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::training());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::from_file(&path).is_err());
        assert!(Config::from_file(dir.path().join("missing.json")).is_err());
    }
}
