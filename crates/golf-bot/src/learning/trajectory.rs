use super::state_key::{ActionKey, StateKey};
use golf_core::game::action::Action;
use golf_core::game::view::GameView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryStep {
    pub state_key: StateKey,
    pub action_key: ActionKey,
    pub action: Action,
    pub round: u8,
}

/// Decisions one seat made during one episode, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    steps: Vec<TrajectoryStep>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, view: &GameView, action: Action) {
        self.steps.push(TrajectoryStep {
            state_key: StateKey::from_view(view),
            action_key: ActionKey::of(action),
            action,
            round: view.round,
        });
    }

    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.steps.iter().map(|step| step.action)
    }
}
