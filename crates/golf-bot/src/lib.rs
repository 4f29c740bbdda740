pub mod agent;
pub mod learning;
pub mod table;

pub use agent::{
    AdvancedEvAgent, AdvancedEvParams, Agent, AgentKind, AnyAgent, DecisionRecord, EvAgent,
    HeuristicAgent, HumanAgent, QLearningAgent, RandomAgent,
};
pub use learning::{QBackend, QStore, QTable, StateKey, Trajectory};
pub use table::{GameHandle, LineupError, PlayStatus, StepOutcome, build_lineup, new_game};
