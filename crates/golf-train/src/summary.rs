use crate::config::{Hyperparameters, ResolvedOutputs, TrainingSettings};
use crate::simulation::SimulationReport;
use crate::stats::ScoreSummary;
use crate::trainer::{Trainer, TrainingOutcome};
use golf_bot::learning::QTableSnapshot;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to serialize output: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}

/// Everything a run reports besides the table itself.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub seed: u64,
    pub training: TrainingSettings,
    pub hyperparameters: Hyperparameters,
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub bootstrap_episodes: usize,
    pub score: Option<ScoreSummary>,
    pub table_states: usize,
    pub table_entries: usize,
    /// SHA-256 of the exported table, for comparing runs.
    pub table_digest: String,
    pub final_epsilon: Option<f32>,
    pub cancelled: bool,
    pub evaluation: Option<SimulationReport>,
}

impl RunSummary {
    pub fn new(
        run_id: &str,
        trainer: &Trainer,
        outcome: &TrainingOutcome,
        snapshot: &QTableSnapshot,
        evaluation: Option<SimulationReport>,
    ) -> Result<Self, OutputError> {
        let stats = &outcome.stats;
        let (table_states, table_entries) = stats.table_size();
        Ok(Self {
            run_id: run_id.to_string(),
            seed: outcome.seed,
            training: trainer.settings().clone(),
            hyperparameters: *trainer.hyperparameters(),
            episodes: stats.episodes,
            wins: stats.wins,
            losses: stats.losses,
            win_rate: stats.win_rate(),
            bootstrap_episodes: stats.bootstrap_episodes,
            score: stats.score_summary(),
            table_states,
            table_entries,
            table_digest: snapshot_digest(snapshot)?,
            final_epsilon: stats.epsilon_trace.last().copied(),
            cancelled: stats.cancelled,
            evaluation,
        })
    }
}

pub fn snapshot_digest(snapshot: &QTableSnapshot) -> Result<String, OutputError> {
    let json = serde_json::to_vec(snapshot)?;
    Ok(hex::encode(Sha256::digest(&json)))
}

/// Writes the Q-table snapshot and the summary as pretty JSON.
pub fn write_outputs(
    outputs: &ResolvedOutputs,
    snapshot: &QTableSnapshot,
    summary: &RunSummary,
) -> Result<(), OutputError> {
    write_json(&outputs.qtable, snapshot)?;
    write_json(&outputs.summary, summary)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<(), OutputError> {
    let io_err = |source| OutputError::Io {
        source,
        path: path.to_path_buf(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n").map_err(io_err)?;
    writer.flush().map_err(io_err)
}
