//! Tabular Q-learning building blocks: state abstraction, value storage,
//! trajectories and the update rule.

pub mod qtable;
pub mod state_key;
pub mod trajectory;
pub mod update;

pub use qtable::{DenseQTable, QBackend, QStore, QTable, QTableSnapshot, SparseQTable};
pub use state_key::{ActionKey, STATE_SPACE_SIZE, StateKey, state_space_size};
pub use trajectory::{Trajectory, TrajectoryStep};
pub use update::{LearningRates, apply_trajectory};
