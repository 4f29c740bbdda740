use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use golf_core::AppInfo;
use golf_train::config::{ResolvedOutputs, TrainingConfig};
use golf_train::logging::init_logging;
use golf_train::simulation::evaluate;
use golf_train::summary::{RunSummary, write_outputs};
use golf_train::trainer::Trainer;

/// Tabular Q-learning trainer for four-card Golf.
#[derive(Debug, Parser)]
#[command(
    name = "golf-train",
    author,
    version,
    about = "Trains a Q-learning Golf agent against a fixed opponent"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "train/train.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of training episodes.
    #[arg(long, value_name = "EPISODES")]
    episodes: Option<usize>,

    /// Override the RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of worker threads.
    #[arg(long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Exit after validating the configuration (no training is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = TrainingConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(episodes) = cli.episodes {
        config.training.episodes = episodes;
    }

    if let Some(seed) = cli.seed {
        config.training.seed = Some(seed);
    }

    if let Some(workers) = cli.workers {
        config.training.workers = workers;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let training = &config.training;

    println!("{} - {}", AppInfo::codename(), AppInfo::version());
    println!(
        "Loaded configuration '{run_id}': {} episodes vs {} ({} players, {} backend, {} worker{})",
        training.episodes,
        training.opponent,
        training.players,
        training.backend,
        training.workers,
        if training.workers == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: training skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let trainer = Trainer::from_config(&config);
    let outcome = trainer
        .run(config.training.episodes)
        .context("training run failed")?;
    let stats = &outcome.stats;
    let (states, entries) = stats.table_size();
    println!(
        "Training complete for '{run_id}' (seed {}): {} episodes, win rate {:.2}%, avg score {:.2}",
        outcome.seed,
        stats.episodes,
        stats.win_rate() * 100.0,
        stats.avg_score()
    );
    println!(
        "  Bootstrap episodes: {} | Q-table: {states} states, {entries} entries",
        stats.bootstrap_episodes
    );

    let evaluation = if config.evaluation.episodes > 0 {
        let table = Arc::new(outcome.table.clone());
        let report = evaluate(
            table,
            config.training.opponent,
            config.training.players,
            config.evaluation.episodes,
            outcome.seed.wrapping_add(1),
        )
        .context("evaluation failed")?;
        if let Some(learner) = report.seat(0) {
            println!(
                "  Greedy evaluation: {} games, win rate {:.2}%{}",
                report.games,
                learner.win_rate * 100.0,
                learner
                    .score
                    .map(|s| format!(
                        ", avg score {:.2} (95% CI {:.2}..{:.2})",
                        s.mean, s.ci95_low, s.ci95_high
                    ))
                    .unwrap_or_default()
            );
        }
        Some(report)
    } else {
        None
    };

    let snapshot = outcome.table.snapshot();
    let summary = RunSummary::new(&run_id, &trainer, &outcome, &snapshot, evaluation)?;
    write_outputs(&outputs, &snapshot, &summary).with_context(|| {
        format!(
            "writing outputs to {} and {}",
            outputs.qtable.display(),
            outputs.summary.display()
        )
    })?;
    println!("Q-table: {}", outputs.qtable.display());
    println!("Summary: {}", outputs.summary.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
