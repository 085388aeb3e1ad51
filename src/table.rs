/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    collections::BTreeMap,
    fmt, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};

use crate::Board;

/// Action label recorded when the side to move had no legal moves.
pub const NO_MOVE_ACTION: &str = "none";

/// Action label recorded for the final state of a finished game.
pub const TERMINAL_ACTION: &str = "terminal";

/// Canonical string encoding of a [`Board`], used as a value-table key.
///
/// Every occupied square contributes one `"row,col:piece"` entry.
/// Entries are sorted by the square's string form and joined by single spaces,
/// so two boards with the same occupancy always produce the same key.
/// The empty board encodes as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey(String);

impl StateKey {
    pub fn new(board: &Board) -> Self {
        let mut entries = board
            .pieces()
            .map(|(square, piece)| (square.to_string(), piece.char()))
            .collect::<Vec<_>>();
        entries.sort();

        let key = entries
            .iter()
            .map(|(square, piece)| format!("{square}:{piece}"))
            .collect::<Vec<_>>()
            .join(" ");

        Self(key)
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Board> for StateKey {
    #[inline(always)]
    fn from(board: &Board) -> Self {
        Self::new(board)
    }
}

impl AsRef<str> for StateKey {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StateKey {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Learned action values: state key to action key to value.
///
/// Unseen pairs are worth `0.0`.
/// Serializes as a flat JSON object of objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueTable {
    rows: BTreeMap<String, BTreeMap<String, f64>>,
}

impl ValueTable {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of taking `action` in `state`, `0.0` if never recorded.
    #[inline(always)]
    pub fn get(&self, state: &str, action: &str) -> f64 {
        self.row(state)
            .and_then(|row| row.get(action))
            .copied()
            .unwrap_or_default()
    }

    /// Records the value of taking `action` in `state`.
    #[inline(always)]
    pub fn set(&mut self, state: &str, action: &str, value: f64) {
        self.rows
            .entry(state.to_string())
            .or_default()
            .insert(action.to_string(), value);
    }

    /// Every recorded action value for `state`.
    #[inline(always)]
    pub fn row(&self, state: &str) -> Option<&BTreeMap<String, f64>> {
        self.rows.get(state)
    }

    /// Highest recorded value for `state`, or `0.0` if it has no recorded actions.
    ///
    /// This may be negative when every recorded action is.
    pub fn max_value(&self, state: &str) -> f64 {
        self.row(state)
            .and_then(|row| row.values().copied().reduce(f64::max))
            .unwrap_or_default()
    }

    /// Number of states with a row in the table.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of recorded state/action pairs.
    pub fn entries(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Overlays this table onto `other`.
    ///
    /// Each action value of `self` overwrites the same entry in `other`, adding it if absent.
    /// States and actions that only exist in `other` are left untouched.
    pub fn merge_into(&self, other: &mut Self) {
        for (state, row) in &self.rows {
            let target = other.rows.entry(state.clone()).or_default();
            for (action, &value) in row {
                target.insert(action.clone(), value);
            }
        }
    }
}

/// Errors raised while writing a [`ValueTable`] to disk.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A [`ValueTable`] persisted as a single JSON file.
///
/// Saving merges into whatever the file holds rather than replacing it,
/// so values learned by other sessions for states not visited in this one survive.
/// The internal lock serializes writers that share this store; there is no cross-process file lock.
#[derive(Debug)]
pub struct TableStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored table.
    ///
    /// Never fails: a missing file yields an empty table, and so does an unreadable or corrupt one (with a warning).
    pub fn load(&self) -> ValueTable {
        let table = self.read_lenient();
        tracing::info!(
            path = %self.path.display(),
            states = table.len(),
            "loaded value table"
        );
        table
    }

    /// Merges `table` into the stored table and writes the result back.
    ///
    /// The merged table is written to a sibling temporary file first, then renamed over the store,
    /// so a reader never observes a partially-written file.
    pub fn merge_save(&self, table: &ValueTable) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut stored = self.read_lenient();
        table.merge_into(&mut stored);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(&stored)?;
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            states = stored.len(),
            "saved value table"
        );
        Ok(())
    }

    /// Reads the stored table, treating every failure as an empty table.
    fn read_lenient(&self) -> ValueTable {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no value table on disk");
                return ValueTable::new();
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to read value table; starting empty");
                return ValueTable::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "corrupt value table; starting empty");
                ValueTable::new()
            }
        }
    }
}
