mod advanced;
mod ev;
mod heuristic;
mod human;
mod qlearning;
mod random;

pub use advanced::{AdvancedEvAgent, AdvancedEvParams, DecisionRecord};
pub use ev::EvAgent;
pub use heuristic::HeuristicAgent;
pub use human::HumanAgent;
pub use qlearning::QLearningAgent;
pub use random::RandomAgent;

use crate::learning::{QTable, Trajectory};
use core::fmt;
use core::str::FromStr;
use golf_core::game::action::Action;
use golf_core::game::view::GameView;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Level, event};

/// A seat's decision maker.
pub trait Agent: Send {
    fn kind(&self) -> AgentKind;

    /// Picks an action from the seat's filtered view. `None` means there is
    /// nothing legal to do (or, for a human proxy, nothing submitted yet).
    fn decide(&mut self, view: &GameView) -> Option<Action>;

    /// [`Agent::decide`], recording the decision into `trajectory` when given.
    fn choose_action(
        &mut self,
        view: &GameView,
        trajectory: Option<&mut Trajectory>,
    ) -> Option<Action> {
        let action = self.decide(view)?;
        if let Some(trajectory) = trajectory {
            trajectory.record(view, action);
        }
        Some(action)
    }

    /// Whether the agent is blocked on external input rather than out of moves.
    fn awaiting_input(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Random,
    Heuristic,
    Ev,
    AdvancedEv,
    QLearning,
    Human,
}

impl AgentKind {
    pub const ALL: [AgentKind; 6] = [
        AgentKind::Random,
        AgentKind::Heuristic,
        AgentKind::Ev,
        AgentKind::AdvancedEv,
        AgentKind::QLearning,
        AgentKind::Human,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AgentKind::Random => "random",
            AgentKind::Heuristic => "heuristic",
            AgentKind::Ev => "ev",
            AgentKind::AdvancedEv => "advanced_ev",
            AgentKind::QLearning => "q_learning",
            AgentKind::Human => "human",
        }
    }

    /// Builds a default-configured agent. A Q-learning agent built this way
    /// starts from an empty table and plays greedily.
    pub fn build(self, seed: u64) -> AnyAgent {
        match self {
            AgentKind::Random => AnyAgent::Random(RandomAgent::new(seed)),
            AgentKind::Heuristic => AnyAgent::Heuristic(HeuristicAgent::new()),
            AgentKind::Ev => AnyAgent::Ev(EvAgent::default()),
            AgentKind::AdvancedEv => AnyAgent::AdvancedEv(AdvancedEvAgent::default()),
            AgentKind::QLearning => AnyAgent::QLearning(QLearningAgent::new(
                Arc::new(QTable::default()),
                0.0,
                seed,
            )),
            AgentKind::Human => AnyAgent::Human(HumanAgent::new()),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random" => Ok(AgentKind::Random),
            "heuristic" => Ok(AgentKind::Heuristic),
            "ev" => Ok(AgentKind::Ev),
            "advanced_ev" | "advancedev" => Ok(AgentKind::AdvancedEv),
            "q_learning" | "qlearning" | "q" => Ok(AgentKind::QLearning),
            "human" => Ok(AgentKind::Human),
            other => Err(format!("unknown agent kind: {other}")),
        }
    }
}

/// Closed set of agents, resolved once when a table is built.
pub enum AnyAgent {
    Random(RandomAgent),
    Heuristic(HeuristicAgent),
    Ev(EvAgent),
    AdvancedEv(AdvancedEvAgent),
    QLearning(QLearningAgent),
    Human(HumanAgent),
}

impl AnyAgent {
    fn inner(&self) -> &dyn Agent {
        match self {
            AnyAgent::Random(agent) => agent,
            AnyAgent::Heuristic(agent) => agent,
            AnyAgent::Ev(agent) => agent,
            AnyAgent::AdvancedEv(agent) => agent,
            AnyAgent::QLearning(agent) => agent,
            AnyAgent::Human(agent) => agent,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Agent {
        match self {
            AnyAgent::Random(agent) => agent,
            AnyAgent::Heuristic(agent) => agent,
            AnyAgent::Ev(agent) => agent,
            AnyAgent::AdvancedEv(agent) => agent,
            AnyAgent::QLearning(agent) => agent,
            AnyAgent::Human(agent) => agent,
        }
    }

    pub fn as_human_mut(&mut self) -> Option<&mut HumanAgent> {
        match self {
            AnyAgent::Human(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn as_advanced(&self) -> Option<&AdvancedEvAgent> {
        match self {
            AnyAgent::AdvancedEv(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn as_q_learning(&self) -> Option<&QLearningAgent> {
        match self {
            AnyAgent::QLearning(agent) => Some(agent),
            _ => None,
        }
    }
}

impl Agent for AnyAgent {
    fn kind(&self) -> AgentKind {
        self.inner().kind()
    }

    fn decide(&mut self, view: &GameView) -> Option<Action> {
        self.inner_mut().decide(view)
    }

    fn choose_action(
        &mut self,
        view: &GameView,
        trajectory: Option<&mut Trajectory>,
    ) -> Option<Action> {
        self.inner_mut().choose_action(view, trajectory)
    }

    fn awaiting_input(&self) -> bool {
        self.inner().awaiting_input()
    }
}

impl From<RandomAgent> for AnyAgent {
    fn from(agent: RandomAgent) -> Self {
        AnyAgent::Random(agent)
    }
}

impl From<HeuristicAgent> for AnyAgent {
    fn from(agent: HeuristicAgent) -> Self {
        AnyAgent::Heuristic(agent)
    }
}

impl From<EvAgent> for AnyAgent {
    fn from(agent: EvAgent) -> Self {
        AnyAgent::Ev(agent)
    }
}

impl From<AdvancedEvAgent> for AnyAgent {
    fn from(agent: AdvancedEvAgent) -> Self {
        AnyAgent::AdvancedEv(agent)
    }
}

impl From<QLearningAgent> for AnyAgent {
    fn from(agent: QLearningAgent) -> Self {
        AnyAgent::QLearning(agent)
    }
}

impl From<HumanAgent> for AnyAgent {
    fn from(agent: HumanAgent) -> Self {
        AnyAgent::Human(agent)
    }
}

fn log_decision(kind: AgentKind, view: &GameView, action: Action, reason: &str, value: f64) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let seat = view.seat().map(|id| id.index());
    let discard = view
        .discard_top
        .map(|card| card.to_string())
        .unwrap_or_else(|| "none".to_string());
    event!(
        target: "golf_bot::decision",
        Level::DEBUG,
        agent = %kind,
        seat = ?seat,
        round = view.round,
        discard = %discard,
        deck = view.deck_size,
        chosen = %action,
        reason,
        value
    );
}
