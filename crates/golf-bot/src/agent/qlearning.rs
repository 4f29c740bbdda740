use super::{Agent, AgentKind, EvAgent, log_decision};
use crate::learning::{ActionKey, QStore, QTable, StateKey};
use golf_core::game::action::Action;
use golf_core::game::view::GameView;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

enum Mode {
    /// Epsilon-greedy over the table.
    Learn,
    /// Delegates every choice to the EV agent; used for bootstrap episodes.
    Imitate(EvAgent),
}

/// Tabular epsilon-greedy learner reading from a shared table snapshot.
///
/// Greedy choice prefers explored actions, even negative ones, over anything
/// the table has never seen. When nothing is explored it picks at random.
pub struct QLearningAgent {
    table: Arc<QTable>,
    epsilon: f32,
    rng: StdRng,
    mode: Mode,
}

impl QLearningAgent {
    pub fn new(table: Arc<QTable>, epsilon: f32, seed: u64) -> Self {
        Self {
            table,
            epsilon: epsilon.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
            mode: Mode::Learn,
        }
    }

    /// A learner that plays like `expert` while still being recorded.
    pub fn imitating(table: Arc<QTable>, expert: EvAgent, seed: u64) -> Self {
        Self {
            mode: Mode::Imitate(expert),
            ..Self::new(table, 0.0, seed)
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn is_imitating(&self) -> bool {
        matches!(self.mode, Mode::Imitate(_))
    }

    pub fn table(&self) -> &Arc<QTable> {
        &self.table
    }

    /// Best explored legal action, if any.
    pub fn greedy(&self, view: &GameView, legal: &[Action]) -> Option<(Action, f32)> {
        let state = StateKey::from_view(view);
        let keys: Vec<ActionKey> = legal.iter().copied().map(ActionKey::of).collect();
        self.table
            .best_explored(&state, &keys)
            .map(|(key, value)| (key.to_action(), value))
    }
}

impl Agent for QLearningAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::QLearning
    }

    fn decide(&mut self, view: &GameView) -> Option<Action> {
        let legal = view.legal_actions();
        if legal.is_empty() {
            return None;
        }
        if let Mode::Imitate(expert) = &mut self.mode {
            return expert.decide(view);
        }

        if self.epsilon > 0.0 && self.rng.gen_bool(f64::from(self.epsilon)) {
            let action = *legal.choose(&mut self.rng)?;
            log_decision(AgentKind::QLearning, view, action, "explore", 0.0);
            return Some(action);
        }
        match self.greedy(view, &legal) {
            Some((action, value)) => {
                log_decision(AgentKind::QLearning, view, action, "greedy", f64::from(value));
                Some(action)
            }
            None => {
                let action = *legal.choose(&mut self.rng)?;
                log_decision(AgentKind::QLearning, view, action, "unexplored", 0.0);
                Some(action)
            }
        }
    }
}
