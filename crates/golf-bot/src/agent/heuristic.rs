use super::{Agent, AgentKind, log_decision};
use golf_core::belief::GridEvaluator;
use golf_core::game::action::Action;
use golf_core::game::view::GameView;

/// One-ply greedy player: projects the expected grid score after every legal
/// action and takes the lowest.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAgent;

impl HeuristicAgent {
    pub fn new() -> Self {
        Self
    }

    /// Expected score change of each legal action against standing pat.
    pub fn score_actions(view: &GameView) -> Vec<(Action, f64)> {
        let Some(seat) = view.seat() else {
            return Vec::new();
        };
        let Some(evaluator) = GridEvaluator::for_seat(view, seat) else {
            return Vec::new();
        };
        view.legal_actions()
            .into_iter()
            .map(|action| {
                let delta = match action {
                    Action::TakeDiscard { position } => view
                        .discard_top
                        .map_or(0.0, |card| evaluator.swap_delta(position, card.rank)),
                    Action::DrawKeep { position } => evaluator.keep_delta(position).unwrap_or(0.0),
                    Action::DrawDiscardAndFlip { flip_position } => {
                        evaluator.flip_delta(flip_position)
                    }
                };
                (action, delta)
            })
            .collect()
    }
}

impl Agent for HeuristicAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Heuristic
    }

    fn decide(&mut self, view: &GameView) -> Option<Action> {
        let mut best: Option<(Action, f64)> = None;
        for (action, delta) in Self::score_actions(view) {
            if best.is_none_or(|(_, current)| delta < current) {
                best = Some((action, delta));
            }
        }
        let (action, delta) = best?;
        let reason = if delta < 0.0 { "improves" } else { "least_harm" };
        log_decision(AgentKind::Heuristic, view, action, reason, delta);
        Some(action)
    }
}
