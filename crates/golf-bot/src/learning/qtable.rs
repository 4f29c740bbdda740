//! Q-value storage. Both backends distinguish an action that was never
//! explored from one that was explored and valued at exactly zero.

use super::state_key::{ACTION_SPACE_SIZE, ActionKey, STATE_SPACE_SIZE, StateKey};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub trait QStore {
    /// `None` when `(state, action)` has never been written.
    fn get(&self, state: &StateKey, action: ActionKey) -> Option<f32>;

    fn set(&mut self, state: &StateKey, action: ActionKey, value: f32);

    /// Every explored action of `state`, ordered by action index.
    fn explored(&self, state: &StateKey) -> Vec<(ActionKey, f32)>;

    /// States with at least one explored action.
    fn state_count(&self) -> usize;

    fn entry_count(&self) -> usize;

    /// Highest explored value in `state`; zero when nothing was explored.
    fn max_value(&self, state: &StateKey) -> f32 {
        self.explored(state)
            .into_iter()
            .map(|(_, value)| value)
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    /// Best explored action among `candidates`, first candidate on ties.
    fn best_explored(&self, state: &StateKey, candidates: &[ActionKey]) -> Option<(ActionKey, f32)> {
        let mut best: Option<(ActionKey, f32)> = None;
        for &action in candidates {
            if let Some(value) = self.get(state, action) {
                if best.is_none_or(|(_, current)| value > current) {
                    best = Some((action, value));
                }
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QBackend {
    #[default]
    Sparse,
    Dense,
}

impl QBackend {
    pub const fn as_str(self) -> &'static str {
        match self {
            QBackend::Sparse => "sparse",
            QBackend::Dense => "dense",
        }
    }
}

impl fmt::Display for QBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sparse" | "hash" => Ok(QBackend::Sparse),
            "dense" | "array" => Ok(QBackend::Dense),
            other => Err(format!("unknown q-table backend: {other}")),
        }
    }
}

/// Hash-map backend; entries are created lazily.
#[derive(Debug, Clone, Default)]
pub struct SparseQTable {
    values: HashMap<StateKey, HashMap<ActionKey, f32>>,
    entries: usize,
}

impl SparseQTable {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QStore for SparseQTable {
    fn get(&self, state: &StateKey, action: ActionKey) -> Option<f32> {
        self.values.get(state)?.get(&action).copied()
    }

    fn set(&mut self, state: &StateKey, action: ActionKey, value: f32) {
        let actions = self.values.entry(state.clone()).or_default();
        if actions.insert(action, value).is_none() {
            self.entries += 1;
        }
    }

    fn explored(&self, state: &StateKey) -> Vec<(ActionKey, f32)> {
        let Some(actions) = self.values.get(state) else {
            return Vec::new();
        };
        let mut explored: Vec<_> = actions.iter().map(|(&key, &value)| (key, value)).collect();
        explored.sort_by_key(|(key, _)| key.index());
        explored
    }

    fn state_count(&self) -> usize {
        self.values.len()
    }

    fn entry_count(&self) -> usize {
        self.entries
    }
}

/// Flat array over the whole closed-form state space. `NaN` marks an
/// unexplored cell, so `NaN` itself can never be stored as a value.
#[derive(Debug, Clone)]
pub struct DenseQTable {
    values: Vec<f32>,
    explored_per_state: Vec<u8>,
    states: usize,
    entries: usize,
}

impl Default for DenseQTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DenseQTable {
    pub fn new() -> Self {
        Self {
            values: vec![f32::NAN; STATE_SPACE_SIZE * ACTION_SPACE_SIZE],
            explored_per_state: vec![0; STATE_SPACE_SIZE],
            states: 0,
            entries: 0,
        }
    }

    fn cell(state: &StateKey, action: ActionKey) -> usize {
        state.index() * ACTION_SPACE_SIZE + action.index()
    }

    fn row(&self, state_index: usize) -> &[f32] {
        let start = state_index * ACTION_SPACE_SIZE;
        &self.values[start..start + ACTION_SPACE_SIZE]
    }
}

impl QStore for DenseQTable {
    fn get(&self, state: &StateKey, action: ActionKey) -> Option<f32> {
        let value = self.values[Self::cell(state, action)];
        (!value.is_nan()).then_some(value)
    }

    fn set(&mut self, state: &StateKey, action: ActionKey, value: f32) {
        debug_assert!(!value.is_nan(), "NaN is reserved for unexplored cells");
        let cell = Self::cell(state, action);
        if self.values[cell].is_nan() {
            self.entries += 1;
            let explored = &mut self.explored_per_state[state.index()];
            if *explored == 0 {
                self.states += 1;
            }
            *explored += 1;
        }
        self.values[cell] = value;
    }

    fn explored(&self, state: &StateKey) -> Vec<(ActionKey, f32)> {
        self.row(state.index())
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_nan())
            .filter_map(|(index, &value)| ActionKey::from_index(index).map(|key| (key, value)))
            .collect()
    }

    fn state_count(&self) -> usize {
        self.states
    }

    fn entry_count(&self) -> usize {
        self.entries
    }
}

#[derive(Debug, Clone)]
pub enum QTable {
    Sparse(SparseQTable),
    Dense(DenseQTable),
}

impl Default for QTable {
    fn default() -> Self {
        QTable::Sparse(SparseQTable::new())
    }
}

impl QTable {
    pub fn new(backend: QBackend) -> Self {
        match backend {
            QBackend::Sparse => QTable::Sparse(SparseQTable::new()),
            QBackend::Dense => QTable::Dense(DenseQTable::new()),
        }
    }

    pub fn backend(&self) -> QBackend {
        match self {
            QTable::Sparse(_) => QBackend::Sparse,
            QTable::Dense(_) => QBackend::Dense,
        }
    }

    /// Read-only export of every explored value, ordered by state and action.
    pub fn snapshot(&self) -> QTableSnapshot {
        let mut states = BTreeMap::new();
        let mut visit = |state: StateKey, explored: Vec<(ActionKey, f32)>| {
            if explored.is_empty() {
                return;
            }
            let actions = explored
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect();
            states.insert(state, actions);
        };
        match self {
            QTable::Sparse(table) => {
                for state in table.values.keys() {
                    visit(state.clone(), table.explored(state));
                }
            }
            QTable::Dense(table) => {
                for (index, &count) in table.explored_per_state.iter().enumerate() {
                    if count == 0 {
                        continue;
                    }
                    if let Some(state) = StateKey::from_index(index) {
                        let explored = table.explored(&state);
                        visit(state, explored);
                    }
                }
            }
        }
        QTableSnapshot {
            backend: self.backend(),
            states: states
                .into_iter()
                .map(|(state, actions)| (state.to_string(), actions))
                .collect(),
        }
    }
}

impl QStore for QTable {
    fn get(&self, state: &StateKey, action: ActionKey) -> Option<f32> {
        match self {
            QTable::Sparse(table) => table.get(state, action),
            QTable::Dense(table) => table.get(state, action),
        }
    }

    fn set(&mut self, state: &StateKey, action: ActionKey, value: f32) {
        match self {
            QTable::Sparse(table) => table.set(state, action, value),
            QTable::Dense(table) => table.set(state, action, value),
        }
    }

    fn explored(&self, state: &StateKey) -> Vec<(ActionKey, f32)> {
        match self {
            QTable::Sparse(table) => table.explored(state),
            QTable::Dense(table) => table.explored(state),
        }
    }

    fn state_count(&self) -> usize {
        match self {
            QTable::Sparse(table) => table.state_count(),
            QTable::Dense(table) => table.state_count(),
        }
    }

    fn entry_count(&self) -> usize {
        match self {
            QTable::Sparse(table) => table.entry_count(),
            QTable::Dense(table) => table.entry_count(),
        }
    }
}

/// State key -> (action key -> value), as consumed by exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTableSnapshot {
    pub backend: QBackend,
    pub states: BTreeMap<String, BTreeMap<String, f32>>,
}

impl QTableSnapshot {
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn entry_count(&self) -> usize {
        self.states.values().map(BTreeMap::len).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
