//! Episodic Q-learning against a fixed opponent.
//!
//! Every episode deals a fresh table with the learner in seat 0. For the first
//! `bootstrap_episodes` the learner imitates the EV agent; afterwards it plays
//! epsilon-greedy from the table as it stood when the episode started. Finished
//! trajectories are shaped into rewards and applied to the live table in
//! episode order, whichever worker played them.

use crate::config::{Hyperparameters, TrainingConfig, TrainingSettings};
use crate::pipeline;
use crate::rewards::RewardShaping;
use crate::stats::ScoreSummary;
use golf_bot::agent::{AgentKind, AnyAgent, EvAgent, QLearningAgent};
use golf_bot::learning::{QBackend, QStore, QTable, Trajectory, apply_trajectory};
use golf_bot::table::{LineupError, PlayStatus, new_game, seat_seed};
use golf_core::belief::EvParams;
use golf_core::model::player::PlayerId;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{Level, event};

pub const LEARNER_SEAT: PlayerId = PlayerId::new(0);

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error(transparent)]
    Lineup(#[from] LineupError),
    #[error("seat {0} stalled waiting for external input")]
    Stalled(PlayerId),
    #[error("episode {0} finished without final scores")]
    Unscored(usize),
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Multiplicative decay applied after every `interval` episodes. The floor
/// only stops decay; it never raises a starting epsilon below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonSchedule {
    current: f32,
    factor: f32,
    interval: usize,
    floor: f32,
}

impl EpsilonSchedule {
    pub fn new(hyper: &Hyperparameters) -> Self {
        Self {
            current: hyper.epsilon,
            factor: hyper.epsilon_decay_factor,
            interval: hyper.epsilon_decay_interval.max(1),
            floor: hyper.epsilon_floor,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Moves past episode `index` (zero-based).
    pub fn advance(&mut self, index: usize) {
        if (index + 1) % self.interval == 0 {
            self.current = (self.current * self.factor).max(self.floor.min(self.current));
        }
    }
}

/// What one episode is played with, fixed before it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodePlan {
    pub index: usize,
    pub seed: u64,
    pub epsilon: f32,
    pub bootstrap: bool,
}

/// Everything an episode needs besides the table, shared by all workers.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeSetup {
    pub players: usize,
    pub opponent: AgentKind,
    pub ev: EvParams,
    pub shaping: RewardShaping,
}

#[derive(Debug, Clone)]
pub struct EpisodeResult {
    pub plan: EpisodePlan,
    pub trajectory: Trajectory,
    pub rewards: Vec<f32>,
    pub scores: Vec<i32>,
    pub learner_score: i32,
    pub won: bool,
}

pub fn episode_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add((index as u64).wrapping_mul(0xD1B5_4A32_D192_ED03))
}

/// Plays one episode against `table`. `Ok(None)` means `cancel` was raised
/// mid-game and the episode was dropped whole.
pub fn play_episode(
    setup: &EpisodeSetup,
    table: Arc<QTable>,
    plan: EpisodePlan,
    cancel: &AtomicBool,
) -> Result<Option<EpisodeResult>, TrainerError> {
    let learner_seed = seat_seed(plan.seed, LEARNER_SEAT.index());
    let learner = if plan.bootstrap {
        QLearningAgent::imitating(table, EvAgent::new(setup.ev), learner_seed)
    } else {
        QLearningAgent::new(table, plan.epsilon, learner_seed)
    };
    let mut lineup: Vec<AnyAgent> = Vec::with_capacity(setup.players);
    lineup.push(learner.into());
    lineup.extend((1..setup.players).map(|seat| setup.opponent.build(seat_seed(plan.seed, seat))));

    let mut game = new_game(setup.players, lineup, plan.seed)?;
    game.record_trajectory(LEARNER_SEAT);
    match game.play_until(|| cancel.load(Ordering::Relaxed)) {
        PlayStatus::Finished => {}
        PlayStatus::Cancelled => return Ok(None),
        PlayStatus::AwaitingInput(seat) => return Err(TrainerError::Stalled(seat)),
    }

    let board = game
        .final_scores()
        .ok_or(TrainerError::Unscored(plan.index))?;
    let scores = board.standings().to_vec();
    let learner_score = board.score(LEARNER_SEAT);
    let won = game.winner() == Some(LEARNER_SEAT);
    let trajectory = game.take_trajectory(LEARNER_SEAT).unwrap_or_default();
    let rewards = setup.shaping.rewards(trajectory.len(), won, learner_score);
    Ok(Some(EpisodeResult {
        plan,
        trajectory,
        rewards,
        scores,
        learner_score,
        won,
    }))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingStats {
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub bootstrap_episodes: usize,
    pub scores: Vec<i32>,
    pub epsilon_trace: Vec<f32>,
    pub table_states: Vec<usize>,
    pub table_entries: Vec<usize>,
    /// Summed absolute TD error of each episode's update.
    pub td_errors: Vec<f32>,
    pub cancelled: bool,
}

impl TrainingStats {
    pub fn win_rate(&self) -> f64 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.wins as f64 / self.episodes as f64
    }

    pub fn avg_score(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().map(|&s| f64::from(s)).sum::<f64>() / self.scores.len() as f64
    }

    /// `(states, entries)` after the last episode.
    pub fn table_size(&self) -> (usize, usize) {
        (
            self.table_states.last().copied().unwrap_or(0),
            self.table_entries.last().copied().unwrap_or(0),
        )
    }

    pub fn score_summary(&self) -> Option<ScoreSummary> {
        ScoreSummary::from_scores(&self.scores)
    }
}

pub struct TrainingOutcome {
    pub table: QTable,
    pub stats: TrainingStats,
    pub seed: u64,
}

pub struct Trainer {
    run_id: String,
    settings: TrainingSettings,
    hyper: Hyperparameters,
    seed: u64,
}

impl Trainer {
    /// A two-player trainer with default settings against `opponent`.
    pub fn new(opponent: AgentKind, hyper: Hyperparameters, seed: u64) -> Self {
        Self {
            run_id: "adhoc".to_string(),
            settings: TrainingSettings {
                opponent,
                seed: Some(seed),
                ..TrainingSettings::default()
            },
            hyper,
            seed,
        }
    }

    /// Takes everything from a validated config. A missing seed is drawn here.
    pub fn from_config(config: &TrainingConfig) -> Self {
        let seed = config.training.seed.unwrap_or_else(rand::random);
        Self {
            run_id: config.run_id.clone(),
            settings: config.training.clone(),
            hyper: config.hyperparameters,
            seed,
        }
    }

    pub fn with_players(mut self, players: usize) -> Self {
        self.settings.players = players;
        self
    }

    pub fn with_backend(mut self, backend: QBackend) -> Self {
        self.settings.backend = backend;
        self
    }

    pub fn with_workers(mut self, workers: usize, batch_size: usize) -> Self {
        self.settings.workers = workers;
        self.settings.batch_size = batch_size;
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.settings.progress_report_interval = interval;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &TrainingSettings {
        &self.settings
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyper
    }

    pub fn episode_setup(&self) -> EpisodeSetup {
        EpisodeSetup {
            players: self.settings.players,
            opponent: self.settings.opponent,
            ev: self.hyper.ev_params(),
            shaping: RewardShaping::new(self.hyper.step_reward),
        }
    }

    pub fn run(&self, episodes: usize) -> Result<TrainingOutcome, TrainerError> {
        self.run_with_cancel(episodes, &AtomicBool::new(false))
    }

    /// Trains on one thread, or fans out when more than one worker is set.
    pub fn run_with_cancel(
        &self,
        episodes: usize,
        cancel: &AtomicBool,
    ) -> Result<TrainingOutcome, TrainerError> {
        if self.settings.workers > 1 {
            self.run_pipelined(episodes, cancel)
        } else {
            self.run_sequential(episodes, cancel)
        }
    }

    /// Each episode reads the table as updated by every episode before it.
    pub fn run_sequential(
        &self,
        episodes: usize,
        cancel: &AtomicBool,
    ) -> Result<TrainingOutcome, TrainerError> {
        let setup = self.episode_setup();
        let mut aggregator = Aggregator::new(self);
        for index in 0..episodes {
            let plan = aggregator.plan(index);
            match play_episode(&setup, aggregator.snapshot(), plan, cancel)? {
                Some(result) => aggregator.absorb(result),
                None => {
                    aggregator.mark_cancelled();
                    break;
                }
            }
        }
        Ok(aggregator.finish())
    }

    /// Batches of `batch_size` episodes run on `workers` threads against one
    /// shared snapshot, then are applied in episode order.
    pub fn run_pipelined(
        &self,
        episodes: usize,
        cancel: &AtomicBool,
    ) -> Result<TrainingOutcome, TrainerError> {
        pipeline::run(self, episodes, cancel)
    }
}

/// The single writer: owns the live table and the statistics.
pub(crate) struct Aggregator<'a> {
    trainer: &'a Trainer,
    table: Arc<QTable>,
    planner: EpsilonSchedule,
    stats: TrainingStats,
}

impl<'a> Aggregator<'a> {
    pub(crate) fn new(trainer: &'a Trainer) -> Self {
        Self {
            trainer,
            table: Arc::new(QTable::new(trainer.settings.backend)),
            planner: EpsilonSchedule::new(&trainer.hyper),
            stats: TrainingStats::default(),
        }
    }

    /// Plans must be requested in episode order.
    pub(crate) fn plan(&mut self, index: usize) -> EpisodePlan {
        let plan = EpisodePlan {
            index,
            seed: episode_seed(self.trainer.seed, index),
            epsilon: self.planner.current(),
            bootstrap: index < self.trainer.hyper.bootstrap_episodes,
        };
        self.planner.advance(index);
        plan
    }

    pub(crate) fn snapshot(&self) -> Arc<QTable> {
        Arc::clone(&self.table)
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.stats.cancelled = true;
    }

    pub(crate) fn absorb(&mut self, result: EpisodeResult) {
        // Workers have dropped their handles by now, so this does not copy.
        let table = Arc::make_mut(&mut self.table);
        let td_error = apply_trajectory(
            table,
            &result.trajectory,
            &result.rewards,
            self.trainer.hyper.rates(),
        );

        let stats = &mut self.stats;
        stats.episodes += 1;
        if result.won {
            stats.wins += 1;
        } else {
            stats.losses += 1;
        }
        if result.plan.bootstrap {
            stats.bootstrap_episodes += 1;
        }
        stats.scores.push(result.learner_score);
        stats.epsilon_trace.push(result.plan.epsilon);
        stats.table_states.push(table.state_count());
        stats.table_entries.push(table.entry_count());
        stats.td_errors.push(td_error);

        event!(
            target: "golf_train::episode",
            Level::DEBUG,
            run_id = %self.trainer.run_id,
            episode = result.plan.index,
            seed = result.plan.seed,
            score = result.learner_score,
            won = result.won,
            steps = result.trajectory.len(),
            td_error
        );

        let interval = self.trainer.settings.progress_report_interval.max(1);
        if (result.plan.index + 1) % interval == 0 {
            let (states, entries) = self.stats.table_size();
            event!(
                target: "golf_train::progress",
                Level::INFO,
                run_id = %self.trainer.run_id,
                episode = result.plan.index + 1,
                phase = if result.plan.bootstrap { "bootstrap" } else { "q_learning" },
                win_rate = self.stats.win_rate(),
                avg_score = self.stats.avg_score(),
                states,
                entries,
                epsilon = result.plan.epsilon
            );
        }
    }

    pub(crate) fn finish(self) -> TrainingOutcome {
        let table = Arc::try_unwrap(self.table).unwrap_or_else(|shared| (*shared).clone());
        event!(
            target: "golf_train::progress",
            Level::INFO,
            run_id = %self.trainer.run_id,
            episodes = self.stats.episodes,
            wins = self.stats.wins,
            avg_score = self.stats.avg_score(),
            states = table.state_count(),
            entries = table.entry_count(),
            cancelled = self.stats.cancelled,
            "training finished"
        );
        TrainingOutcome {
            table,
            stats: self.stats,
            seed: self.trainer.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsilon_decays_on_interval_and_stops_at_floor() {
        let hyper = Hyperparameters {
            epsilon: 0.2,
            epsilon_decay_factor: 0.5,
            epsilon_decay_interval: 2,
            epsilon_floor: 0.03,
            ..Hyperparameters::default()
        };
        let mut schedule = EpsilonSchedule::new(&hyper);
        let mut trace = Vec::new();
        for index in 0..8 {
            trace.push(schedule.current());
            schedule.advance(index);
        }
        assert_eq!(trace, vec![0.2, 0.2, 0.1, 0.1, 0.05, 0.05, 0.03, 0.03]);
    }

    #[test]
    fn zero_epsilon_stays_zero() {
        let hyper = Hyperparameters {
            epsilon: 0.0,
            epsilon_decay_interval: 1,
            ..Hyperparameters::default()
        };
        let mut schedule = EpsilonSchedule::new(&hyper);
        for index in 0..5 {
            schedule.advance(index);
        }
        assert_eq!(schedule.current(), 0.0);
    }

    #[test]
    fn episode_reports_scores_and_rewards() {
        let trainer = Trainer::new(AgentKind::Ev, Hyperparameters::default(), 3);
        let plan = EpisodePlan {
            index: 0,
            seed: 77,
            epsilon: 0.2,
            bootstrap: false,
        };
        let result = play_episode(
            &trainer.episode_setup(),
            Arc::new(QTable::default()),
            plan,
            &AtomicBool::new(false),
        )
        .expect("episode")
        .expect("not cancelled");
        assert_eq!(result.trajectory.len(), 4);
        assert_eq!(result.rewards.len(), 4);
        assert_eq!(result.scores.len(), 2);
        assert_eq!(result.learner_score, result.scores[0]);
        let winner_score = result.scores.iter().copied().min().expect("scores");
        assert_eq!(result.won, result.scores[0] == winner_score);
    }

    #[test]
    fn raised_cancel_drops_the_episode() {
        let trainer = Trainer::new(AgentKind::Random, Hyperparameters::default(), 3);
        let plan = EpisodePlan {
            index: 0,
            seed: 1,
            epsilon: 0.0,
            bootstrap: true,
        };
        let result = play_episode(
            &trainer.episode_setup(),
            Arc::new(QTable::default()),
            plan,
            &AtomicBool::new(true),
        )
        .expect("no error");
        assert!(result.is_none());

        let outcome = trainer
            .run_with_cancel(10, &AtomicBool::new(true))
            .expect("run");
        assert!(outcome.stats.cancelled);
        assert_eq!(outcome.stats.episodes, 0);
        assert_eq!(outcome.table.entry_count(), 0);
    }

    #[test]
    fn stats_track_every_episode() {
        let hyper = Hyperparameters {
            bootstrap_episodes: 2,
            ..Hyperparameters::default()
        };
        let outcome = Trainer::new(AgentKind::Random, hyper, 11)
            .run(6)
            .expect("train");
        let stats = &outcome.stats;
        assert_eq!(stats.episodes, 6);
        assert_eq!(stats.wins + stats.losses, 6);
        assert_eq!(stats.bootstrap_episodes, 2);
        assert_eq!(stats.scores.len(), 6);
        assert_eq!(stats.epsilon_trace, vec![0.2; 6]);
        assert!(stats.table_states.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(
            stats.table_size(),
            (outcome.table.state_count(), outcome.table.entry_count())
        );
        assert!(outcome.table.entry_count() > 0);
    }
}
