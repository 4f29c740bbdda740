use golf_bot::agent::AgentKind;
use golf_bot::learning::{LearningRates, QBackend};
use golf_core::belief::EvParams;
use golf_core::game::state::{MAX_PLAYERS, MIN_PLAYERS};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root training configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TrainingConfig {
    pub run_id: String,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub hyperparameters: Hyperparameters,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrainingConfig {
    /// A config with every block at its default.
    pub fn with_run_id(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            training: TrainingSettings::default(),
            hyperparameters: Hyperparameters::default(),
            evaluation: EvaluationConfig::default(),
            outputs: OutputsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: TrainingConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.training.validate()?;
        self.hyperparameters.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve `{run_id}` placeholders into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            qtable: resolve_template(&self.run_id, &self.outputs.qtable),
            summary: resolve_template(&self.run_id, &self.outputs.summary),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TrainingSettings {
    pub episodes: usize,
    /// Drawn at random when absent; the run summary records the value used.
    pub seed: Option<u64>,
    pub players: usize,
    pub opponent: AgentKind,
    pub backend: QBackend,
    /// Worker threads; one plays episodes sequentially against the live table.
    pub workers: usize,
    /// Episodes per fan-out batch; every batch reads one table snapshot.
    pub batch_size: usize,
    pub progress_report_interval: usize,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            episodes: 1_000,
            seed: None,
            players: 2,
            opponent: AgentKind::Ev,
            backend: QBackend::Sparse,
            workers: 1,
            batch_size: 32,
            progress_report_interval: 100,
        }
    }
}

impl TrainingSettings {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.episodes == 0 {
            return Err(invalid("training.episodes", "must be greater than zero"));
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(invalid(
                "training.players",
                format!("must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            ));
        }
        if self.opponent == AgentKind::Human {
            return Err(invalid(
                "training.opponent",
                "a human proxy cannot sit at an unattended table",
            ));
        }
        if self.workers == 0 {
            return Err(invalid("training.workers", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(invalid("training.batch_size", "must be at least 1"));
        }
        if self.progress_report_interval == 0 {
            return Err(invalid(
                "training.progress_report_interval",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Hyperparameters {
    pub learning_rate: f32,
    pub discount_factor: f32,
    pub epsilon: f32,
    pub epsilon_decay_factor: f32,
    pub epsilon_decay_interval: usize,
    pub epsilon_floor: f32,
    /// Leading episodes in which the learner imitates the EV agent.
    pub bootstrap_episodes: usize,
    pub step_reward: f32,
    pub flip_bonus: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.2,
            epsilon_decay_factor: 0.995,
            epsilon_decay_interval: 100,
            epsilon_floor: 0.01,
            bootstrap_episodes: 250,
            step_reward: 0.1,
            flip_bonus: 0.0,
        }
    }
}

impl Hyperparameters {
    pub fn rates(&self) -> LearningRates {
        LearningRates {
            learning_rate: self.learning_rate,
            discount_factor: self.discount_factor,
        }
    }

    pub fn ev_params(&self) -> EvParams {
        EvParams {
            flip_bonus: self.flip_bonus,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(invalid("hyperparameters.learning_rate", "must be in (0, 1]"));
        }
        for (field, value) in [
            ("hyperparameters.discount_factor", self.discount_factor),
            ("hyperparameters.epsilon", self.epsilon),
            ("hyperparameters.epsilon_floor", self.epsilon_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be in [0, 1]"));
            }
        }
        if !(self.epsilon_decay_factor > 0.0 && self.epsilon_decay_factor <= 1.0) {
            return Err(invalid(
                "hyperparameters.epsilon_decay_factor",
                "must be in (0, 1]",
            ));
        }
        if self.epsilon_decay_interval == 0 {
            return Err(invalid(
                "hyperparameters.epsilon_decay_interval",
                "must be at least 1",
            ));
        }
        if !self.step_reward.is_finite() {
            return Err(invalid("hyperparameters.step_reward", "must be finite"));
        }
        if !self.flip_bonus.is_finite() {
            return Err(invalid("hyperparameters.flip_bonus", "must be finite"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Greedy games against the opponent after training; zero skips evaluation.
    pub episodes: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { episodes: 200 }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputsConfig {
    pub qtable: String,
    pub summary: String,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            qtable: "train/out/{run_id}/qtable.json".to_string(),
            summary: "train/out/{run_id}/summary.json".to_string(),
        }
    }
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.qtable", &self.qtable),
            ("outputs.summary", &self.summary),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(label, "path must not be empty"));
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(invalid(label, "resolved path is invalid"));
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.into(),
    }
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(invalid("run_id", "run_id must not be empty"));
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub qtable: PathBuf,
    pub summary: PathBuf,
}

impl ResolvedOutputs {
    /// Directory that receives the structured log next to the summary.
    pub fn telemetry_dir(&self) -> PathBuf {
        self.summary
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
