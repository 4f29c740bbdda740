use super::ev::recommendation_label;
use super::{Agent, AgentKind, log_decision};
use golf_core::belief::{EvParams, GridEvaluator, Recommendation, expected_value_draw_vs_discard};
use golf_core::game::action::Action;
use golf_core::game::view::GameView;
use golf_core::model::grid::GRID_SIZE;
use golf_core::model::rank::Rank;
use golf_core::model::score::find_pairs;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvancedEvParams {
    pub ev: EvParams,
    /// Scaled by the chance that a hidden flip matches a lone known rank.
    pub pair_bonus: f64,
    /// Charged for replacing a card that currently sits in a counted pair.
    pub break_penalty: f64,
    pub history_capacity: usize,
}

impl Default for AdvancedEvParams {
    fn default() -> Self {
        Self {
            ev: EvParams::default(),
            pair_bonus: 1.0,
            break_penalty: 2.0,
            history_capacity: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub round: u8,
    pub recommendation: Recommendation,
    pub advantage: f64,
    pub action: Action,
    /// Adjusted value of the chosen action.
    pub value: f64,
}

/// EV player with pair awareness: it leans towards flips likely to land a
/// pair and away from swaps that split one.
#[derive(Debug, Clone, Default)]
pub struct AdvancedEvAgent {
    params: AdvancedEvParams,
    history: VecDeque<DecisionRecord>,
}

impl AdvancedEvAgent {
    pub fn new(params: AdvancedEvParams) -> Self {
        Self {
            params,
            history: VecDeque::with_capacity(params.history_capacity),
        }
    }

    /// Most recent decisions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.history.iter()
    }

    pub fn last_decision(&self) -> Option<&DecisionRecord> {
        self.history.back()
    }

    fn remember(&mut self, record: DecisionRecord) {
        if self.params.history_capacity == 0 {
            return;
        }
        while self.history.len() >= self.params.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    fn candidates(
        &self,
        eval: &GridEvaluator,
        recommendation: Recommendation,
        discard: Option<Rank>,
    ) -> Vec<(Action, f64)> {
        let in_pair = paired_positions(eval.ranks());
        let lone = lone_ranks(eval.ranks());
        let mut scored = Vec::new();

        match recommendation {
            Recommendation::Discard => {
                let Some(rank) = discard else {
                    return scored;
                };
                for &position in eval.available() {
                    let mut value = eval.swap_delta(position, rank);
                    if in_pair[position] && eval.ranks()[position] != Some(rank) {
                        value += self.params.break_penalty;
                    }
                    scored.push((Action::TakeDiscard { position }, value));
                }
            }
            Recommendation::Draw | Recommendation::NearIndifferent => {
                let Some(dist) = eval.distribution() else {
                    return scored;
                };
                for &position in eval.available() {
                    let mut keep = eval.keep_delta(position).unwrap_or(0.0);
                    if in_pair[position] {
                        let keeps_pair =
                            eval.ranks()[position].map_or(0.0, |r| dist.probability(r));
                        keep += self.params.break_penalty * (1.0 - keeps_pair);
                    }
                    scored.push((Action::DrawKeep { position }, keep));
                }
                for &position in eval.available() {
                    let mut flip = eval.flip_delta(position) - self.params.ev.flip_bonus;
                    if eval.ranks()[position].is_none() {
                        let match_chance: f64 = lone.iter().map(|&r| dist.probability(r)).sum();
                        flip -= self.params.pair_bonus * match_chance;
                    }
                    scored.push((
                        Action::DrawDiscardAndFlip {
                            flip_position: position,
                        },
                        flip,
                    ));
                }
            }
            Recommendation::NoMove => {}
        }
        scored
    }
}

/// Positions the greedy matcher currently counts as paired.
fn paired_positions(ranks: &[Option<Rank>; GRID_SIZE]) -> [bool; GRID_SIZE] {
    let mut paired = [false; GRID_SIZE];
    for (a, b) in find_pairs(ranks) {
        paired[a] = true;
        paired[b] = true;
    }
    paired
}

/// Known ranks not already part of a counted pair, deduplicated.
fn lone_ranks(ranks: &[Option<Rank>; GRID_SIZE]) -> Vec<Rank> {
    let paired = paired_positions(ranks);
    let mut lone: Vec<Rank> = ranks
        .iter()
        .zip(paired)
        .filter(|(_, is_paired)| !is_paired)
        .filter_map(|(rank, _)| *rank)
        .collect();
    lone.sort();
    lone.dedup();
    lone
}

impl Agent for AdvancedEvAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::AdvancedEv
    }

    fn decide(&mut self, view: &GameView) -> Option<Action> {
        if !view.is_my_turn() {
            return None;
        }
        let seat = view.seat()?;
        let analysis = expected_value_draw_vs_discard(view, seat, &self.params.ev);
        let eval = GridEvaluator::for_seat(view, seat)?;
        let discard = view.discard_top.map(|card| card.rank);

        let mut best: Option<(Action, f64)> = None;
        for (action, value) in self.candidates(&eval, analysis.recommendation, discard) {
            if best.is_none_or(|(_, current)| value < current) {
                best = Some((action, value));
            }
        }
        let (action, value) = best?;

        self.remember(DecisionRecord {
            round: view.round,
            recommendation: analysis.recommendation,
            advantage: analysis.advantage,
            action,
            value,
        });
        log_decision(
            AgentKind::AdvancedEv,
            view,
            action,
            recommendation_label(analysis.recommendation),
            value,
        );
        Some(action)
    }
}
