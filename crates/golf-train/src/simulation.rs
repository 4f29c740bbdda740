//! Learning-free games between fixed lineups.

use crate::stats::ScoreSummary;
use crate::trainer::{LEARNER_SEAT, TrainerError, episode_seed};
use golf_bot::agent::{AgentKind, AnyAgent, QLearningAgent};
use golf_bot::learning::QTable;
use golf_bot::table::{GameHandle, PlayStatus, build_lineup, new_game, seat_seed};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatReport {
    pub seat: usize,
    pub agent: AgentKind,
    pub wins: usize,
    pub win_rate: f64,
    pub score: Option<ScoreSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub games: usize,
    pub seed: u64,
    pub seats: Vec<SeatReport>,
}

impl SimulationReport {
    pub fn seat(&self, seat: usize) -> Option<&SeatReport> {
        self.seats.get(seat)
    }
}

struct GameResult {
    scores: Vec<i32>,
    winner: usize,
}

fn finish(mut game: GameHandle, index: usize) -> Result<GameResult, TrainerError> {
    match game.play_to_end() {
        PlayStatus::Finished => {}
        PlayStatus::AwaitingInput(seat) => return Err(TrainerError::Stalled(seat)),
        PlayStatus::Cancelled => return Err(TrainerError::Unscored(index)),
    }
    let board = game.final_scores().ok_or(TrainerError::Unscored(index))?;
    let winner = game.winner().ok_or(TrainerError::Unscored(index))?;
    Ok(GameResult {
        scores: board.standings().to_vec(),
        winner: winner.index(),
    })
}

fn report(kinds: &[AgentKind], seed: u64, results: &[GameResult]) -> SimulationReport {
    let games = results.len();
    let seats = kinds
        .iter()
        .enumerate()
        .map(|(seat, &agent)| {
            let wins = results.iter().filter(|game| game.winner == seat).count();
            let scores: Vec<i32> = results
                .iter()
                .filter_map(|game| game.scores.get(seat).copied())
                .collect();
            SeatReport {
                seat,
                agent,
                wins,
                win_rate: if games == 0 { 0.0 } else { wins as f64 / games as f64 },
                score: ScoreSummary::from_scores(&scores),
            }
        })
        .collect();
    SimulationReport { games, seed, seats }
}

/// Plays `games` games between default agents of `lineup`, seat by seat.
/// Games run in parallel; results do not depend on scheduling.
pub fn simulate(
    lineup: &[AgentKind],
    games: usize,
    seed: u64,
) -> Result<SimulationReport, TrainerError> {
    let results = (0..games)
        .into_par_iter()
        .map(|index| {
            let game_seed = episode_seed(seed, index);
            let game = new_game(lineup.len(), build_lineup(lineup, game_seed), game_seed)?;
            finish(game, index)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let report = report(lineup, seed, &results);
    log_report("simulation", &report);
    Ok(report)
}

/// Greedy games for a trained table in seat 0 against `opponent`.
pub fn evaluate(
    table: Arc<QTable>,
    opponent: AgentKind,
    players: usize,
    games: usize,
    seed: u64,
) -> Result<SimulationReport, TrainerError> {
    let results = (0..games)
        .into_par_iter()
        .map(|index| {
            let game_seed = episode_seed(seed, index);
            let learner = QLearningAgent::new(
                Arc::clone(&table),
                0.0,
                seat_seed(game_seed, LEARNER_SEAT.index()),
            );
            let mut lineup: Vec<AnyAgent> = vec![learner.into()];
            lineup.extend((1..players).map(|seat| opponent.build(seat_seed(game_seed, seat))));
            let game = new_game(players, lineup, game_seed)?;
            finish(game, index)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut kinds = vec![AgentKind::QLearning];
    kinds.extend(std::iter::repeat_n(opponent, players.saturating_sub(1)));
    let report = report(&kinds, seed, &results);
    log_report("evaluation", &report);
    Ok(report)
}

fn log_report(kind: &str, report: &SimulationReport) {
    for seat in &report.seats {
        event!(
            target: "golf_train::simulation",
            Level::INFO,
            kind,
            games = report.games,
            seat = seat.seat,
            agent = %seat.agent,
            wins = seat.wins,
            win_rate = seat.win_rate,
            avg_score = seat.score.map(|s| s.mean)
        );
    }
}
