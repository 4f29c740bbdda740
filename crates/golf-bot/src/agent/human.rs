use super::{Agent, AgentKind};
use golf_core::game::action::Action;
use golf_core::game::view::GameView;
use std::collections::VecDeque;
use tracing::debug;

/// Plays whatever an external front end submits.
///
/// Submissions queue up; on its turn the proxy plays the first one that is
/// legal and drops any stale ones ahead of it.
#[derive(Debug, Clone, Default)]
pub struct HumanAgent {
    inbox: VecDeque<Action>,
    rejected: Vec<Action>,
}

impl HumanAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, action: Action) {
        self.inbox.push_back(action);
    }

    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    /// Submissions dropped because they were illegal when their turn came.
    /// Draining them is the front end's cue to prompt again.
    pub fn take_rejected(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.rejected)
    }
}

impl Agent for HumanAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Human
    }

    fn decide(&mut self, view: &GameView) -> Option<Action> {
        let legal = view.legal_actions();
        if legal.is_empty() {
            return None;
        }
        while let Some(action) = self.inbox.pop_front() {
            if legal.contains(&action) {
                return Some(action);
            }
            debug!(target: "golf_bot::human", %action, "dropping stale submission");
            self.rejected.push(action);
        }
        None
    }

    fn awaiting_input(&self) -> bool {
        self.inbox.is_empty()
    }
}
