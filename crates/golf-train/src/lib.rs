pub mod config;
pub mod logging;
mod pipeline;
pub mod rewards;
pub mod simulation;
pub mod stats;
pub mod summary;
pub mod trainer;

pub use config::{ConfigError, TrainingConfig, ValidationError};
pub use simulation::{SimulationReport, evaluate, simulate};
pub use trainer::{Trainer, TrainerError, TrainingOutcome, TrainingStats};
