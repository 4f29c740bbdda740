use super::{Agent, AgentKind, log_decision};
use golf_core::game::action::{Action, ActionKind};
use golf_core::game::view::GameView;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Picks an open position and an action family uniformly at random.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Random
    }

    fn decide(&mut self, view: &GameView) -> Option<Action> {
        if !view.is_my_turn() {
            return None;
        }
        let positions = view.available_positions();
        let mut families = Vec::with_capacity(3);
        if view.discard_top.is_some() {
            families.push(ActionKind::TakeDiscard);
        }
        if view.deck_size > 0 {
            families.push(ActionKind::DrawKeep);
            families.push(ActionKind::DrawDiscardAndFlip);
        }
        let position = *positions.choose(&mut self.rng)?;
        let kind = *families.choose(&mut self.rng)?;
        let action = Action::from_parts(kind, position);
        log_decision(AgentKind::Random, view, action, "uniform", 0.0);
        Some(action)
    }
}
