/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    compute_reward, legal_successors, Board, RewardWeights, Side, StateKey, StoreError, TableStore,
    ValueTable, NO_MOVE_ACTION, TERMINAL_ACTION,
};

/// Hyperparameters of the temporal-difference update and the exploration policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningParams {
    /// Learning rate.
    pub alpha: f64,

    /// Discount applied to the value of the resulting state.
    pub gamma: f64,

    /// Probability of picking a random move instead of the best known one.
    pub epsilon: f64,
}

impl Default for LearningParams {
    #[inline(always)]
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.9,
            epsilon: 0.2,
        }
    }
}

/// Rewards written when a game ends, or when the side to move cannot move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalRewards {
    /// Reward for the final state of a game the learner won.
    pub win: f64,

    /// Reward for the final state of a game the learner lost.
    pub loss: f64,

    /// Reward for the final state of a drawn game.
    pub draw: f64,

    /// Whether a drawn game records a terminal update at all.
    pub update_on_draw: bool,

    /// Reward for a turn on which the learner had no legal moves.
    pub no_moves: f64,
}

impl TerminalRewards {
    /// Rewards used while playing against a human: draws are not recorded.
    pub const fn play() -> Self {
        Self {
            win: 20.0,
            loss: -20.0,
            draw: 0.0,
            update_on_draw: false,
            no_moves: -1.0,
        }
    }

    /// Rewards used for self-play training: every episode ends with a terminal update.
    pub const fn training() -> Self {
        Self {
            update_on_draw: true,
            ..Self::play()
        }
    }
}

impl Default for TerminalRewards {
    #[inline(always)]
    fn default() -> Self {
        Self::play()
    }
}

/// What happened on one turn played by a [`QAgent`].
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// The agent moved from `state` to `board`, whose key is `action`, and was rewarded `reward`.
    Moved {
        board: Board,
        state: StateKey,
        action: StateKey,
        reward: f64,
    },

    /// The agent had no legal moves in `state` and passed.
    Passed { state: StateKey },
}

/// A tabular Q-learning player.
///
/// Actions and resulting states share one key space: the action of a move is the [`StateKey`] of the board it produces.
///
/// Reads go through the full table the agent was created with. Every value the agent writes is also kept in a
/// separate overlay of pending updates, and only that overlay is merged into a store on [`QAgent::save_to`].
/// Entries loaded from the store but never updated are therefore never written back.
#[derive(Debug, Clone)]
pub struct QAgent {
    table: ValueTable,

    /// Values updated since the last successful save.
    pending: ValueTable,

    params: LearningParams,
    rng: StdRng,
}

impl QAgent {
    /// Creates an agent over `table`. Supplying a `seed` makes its move choices reproducible.
    pub fn new(table: ValueTable, params: LearningParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            table,
            pending: ValueTable::new(),
            params,
            rng,
        }
    }

    #[inline(always)]
    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    /// Values updated since the last successful [`QAgent::save_to`].
    #[inline(always)]
    pub fn pending(&self) -> &ValueTable {
        &self.pending
    }

    #[inline(always)]
    pub fn params(&self) -> &LearningParams {
        &self.params
    }

    /// Epsilon-greedy choice among `successors` of the board keyed `state`, returning an index into `successors`.
    ///
    /// Exploits by picking the successor with the highest recorded value (unseen actions are worth `0.0`),
    /// keeping the first one found on ties. Falls back to a random pick when `state` has no recorded actions.
    /// Returns `None` only if `successors` is empty.
    pub fn choose(&mut self, state: &StateKey, successors: &[Board]) -> Option<usize> {
        if successors.is_empty() {
            return None;
        }

        if self.rng.gen::<f64>() < self.params.epsilon {
            return Some(self.rng.gen_range(0..successors.len()));
        }

        let Some(row) = self.table.row(state.as_str()).filter(|row| !row.is_empty()) else {
            return Some(self.rng.gen_range(0..successors.len()));
        };

        let mut best = None;
        let mut best_value = f64::NEG_INFINITY;
        for (i, successor) in successors.iter().enumerate() {
            let action = StateKey::new(successor);
            let value = row.get(action.as_str()).copied().unwrap_or_default();
            if value > best_value {
                best_value = value;
                best = Some(i);
            }
        }

        best
    }

    /// Applies one temporal-difference update to the value of taking `action` in `state`.
    ///
    /// The value of `next` is its best recorded action value, or `0.0` when absent.
    /// Returns the updated value.
    ///
    /// # Example
    /// ```
    /// # use draughts::{LearningParams, QAgent, ValueTable};
    /// let mut agent = QAgent::new(ValueTable::new(), LearningParams::default(), Some(0));
    /// assert_eq!(agent.update("s", "terminal", 20.0, None), 10.0);
    /// assert_eq!(agent.update("s", "terminal", 20.0, None), 15.0);
    /// ```
    pub fn update(&mut self, state: &str, action: &str, reward: f64, next: Option<&str>) -> f64 {
        let LearningParams { alpha, gamma, .. } = self.params;

        let current = self.table.get(state, action);
        let next_max = next.map_or(0.0, |next| self.table.max_value(next));
        let value = current + alpha * (reward + gamma * next_max - current);

        self.table.set(state, action, value);
        self.pending.set(state, action, value);
        value
    }

    /// Merges the pending updates into `store`, clearing them once they are on disk.
    ///
    /// On failure the updates stay pending, so the next save retries them.
    pub fn save_to(&mut self, store: &TableStore) -> Result<(), StoreError> {
        store.merge_save(&self.pending)?;
        self.pending = ValueTable::new();
        Ok(())
    }

    /// Plays one turn for `side` on `board`.
    ///
    /// If `side` can move, a successor is chosen and the update for that transition is applied using the reward
    /// `weights`. Otherwise the turn is recorded under [`NO_MOVE_ACTION`] with the `no_moves` reward and no next state.
    pub fn act(
        &mut self,
        board: &Board,
        side: Side,
        weights: &RewardWeights,
        no_moves: f64,
    ) -> AgentStep {
        let state = StateKey::new(board);
        let mut successors = legal_successors(board, side);

        let Some(index) = self.choose(&state, &successors) else {
            self.update(state.as_str(), NO_MOVE_ACTION, no_moves, None);
            tracing::debug!(%side, "no legal moves; passing");
            return AgentStep::Passed { state };
        };

        let next = successors.swap_remove(index);
        let action = StateKey::new(&next);
        let reward = compute_reward(board, &next, side, weights);
        self.update(state.as_str(), action.as_str(), reward, Some(action.as_str()));

        tracing::debug!(%side, %action, reward, "agent moved");

        AgentStep::Moved {
            board: next,
            state,
            action,
            reward,
        }
    }

    /// Records the end of a game: one update of the final `board` under [`TERMINAL_ACTION`], with no next state.
    pub fn record_terminal(&mut self, board: &Board, reward: f64) -> f64 {
        let state = StateKey::new(board);
        self.update(state.as_str(), TERMINAL_ACTION, reward, None)
    }
}
