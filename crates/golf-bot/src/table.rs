//! Drives a game with one agent per seat.

use crate::agent::{Agent, AgentKind, AnyAgent};
use crate::learning::Trajectory;
use golf_core::game::action::Action;
use golf_core::game::error::{GameSetupError, IllegalActionError};
use golf_core::game::state::{AppliedAction, GameState};
use golf_core::game::view::{GameView, Viewer};
use golf_core::model::player::PlayerId;
use golf_core::model::score::ScoreBoard;
use thiserror::Error;
use tracing::{Level, debug, event};

#[derive(Debug, Error)]
pub enum LineupError {
    #[error(transparent)]
    Setup(#[from] GameSetupError),
    #[error("lineup has {agents} agents for {players} seats")]
    SeatCount { players: usize, agents: usize },
    #[error("seat {0} is not a human proxy")]
    NotHuman(PlayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Applied(AppliedAction),
    Forfeited {
        player: PlayerId,
        action: Action,
        error: IllegalActionError,
    },
    Passed(PlayerId),
    /// The seat's agent is waiting on an external submission.
    AwaitingInput(PlayerId),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStatus {
    Finished,
    AwaitingInput(PlayerId),
    Cancelled,
}

/// Default agents for `kinds`, each seeded from `seed` and its seat.
pub fn build_lineup(kinds: &[AgentKind], seed: u64) -> Vec<AnyAgent> {
    kinds
        .iter()
        .enumerate()
        .map(|(seat, kind)| kind.build(seat_seed(seed, seat)))
        .collect()
}

pub fn seat_seed(seed: u64, seat: usize) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(seat as u64 + 1)
}

/// Deals a fresh game for `lineup`, one agent per seat in seat order.
pub fn new_game(
    num_players: usize,
    lineup: Vec<AnyAgent>,
    seed: u64,
) -> Result<GameHandle, LineupError> {
    let state = GameState::with_seed(num_players, seed)?;
    GameHandle::from_state(state, lineup)
}

pub struct GameHandle {
    state: GameState,
    agents: Vec<AnyAgent>,
    trajectories: Vec<Option<Trajectory>>,
}

impl GameHandle {
    /// Seats `lineup` at an existing table, e.g. one built from a fixed layout.
    pub fn from_state(state: GameState, lineup: Vec<AnyAgent>) -> Result<Self, LineupError> {
        if lineup.len() != state.num_players() {
            return Err(LineupError::SeatCount {
                players: state.num_players(),
                agents: lineup.len(),
            });
        }
        let trajectories = vec![None; lineup.len()];
        Ok(Self {
            state,
            agents: lineup,
            trajectories,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn num_players(&self) -> usize {
        self.state.num_players()
    }

    pub fn agent(&self, seat: PlayerId) -> Option<&AnyAgent> {
        self.agents.get(seat.index())
    }

    pub fn agent_mut(&mut self, seat: PlayerId) -> Option<&mut AnyAgent> {
        self.agents.get_mut(seat.index())
    }

    /// Starts recording `seat`'s decisions from the next turn on.
    pub fn record_trajectory(&mut self, seat: PlayerId) {
        if let Some(slot) = self.trajectories.get_mut(seat.index()) {
            slot.get_or_insert_with(Trajectory::new);
        }
    }

    pub fn take_trajectory(&mut self, seat: PlayerId) -> Option<Trajectory> {
        self.trajectories.get_mut(seat.index())?.take()
    }

    pub fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        self.state.legal_actions(player)
    }

    /// Plays `action` for `player` directly, bypassing the seat's agent.
    pub fn apply(
        &mut self,
        player: PlayerId,
        action: Action,
    ) -> Result<AppliedAction, IllegalActionError> {
        self.state.apply(player, action)
    }

    pub fn view(&self, viewer: Viewer) -> GameView {
        self.state.view(viewer)
    }

    /// Queues `action` for a human-proxy seat.
    pub fn submit(&mut self, player: PlayerId, action: Action) -> Result<(), LineupError> {
        self.agents
            .get_mut(player.index())
            .and_then(AnyAgent::as_human_mut)
            .ok_or(LineupError::NotHuman(player))?
            .submit(action);
        Ok(())
    }

    /// Lets the current seat's agent take one turn.
    pub fn step(&mut self) -> StepOutcome {
        if self.state.is_finished() {
            return StepOutcome::Finished;
        }
        let seat = self.state.current_player();
        let view = self.state.view_for(seat);
        let index = seat.index();
        let Some(agent) = self.agents.get_mut(index) else {
            return StepOutcome::Finished;
        };
        let trajectory = self.trajectories.get_mut(index).and_then(Option::as_mut);
        // A seat with nothing left to turn over passes, whoever is sitting in it.
        let stuck = self.state.legal_actions(seat).is_empty();

        match agent.choose_action(&view, trajectory) {
            Some(action) => match self.state.apply(seat, action) {
                Ok(applied) => {
                    if applied.game_over {
                        self.log_finish();
                    }
                    StepOutcome::Applied(applied)
                }
                Err(error) => {
                    debug!(target: "golf_bot::table", %seat, %action, %error, "turn forfeited");
                    StepOutcome::Forfeited {
                        player: seat,
                        action,
                        error,
                    }
                }
            },
            None if !stuck && agent.awaiting_input() => StepOutcome::AwaitingInput(seat),
            None => match self.state.pass_turn(seat) {
                Ok(()) => {
                    if self.state.is_finished() {
                        self.log_finish();
                    }
                    StepOutcome::Passed(seat)
                }
                Err(_) => StepOutcome::Finished,
            },
        }
    }

    /// Plays until the game ends or a human seat needs input.
    pub fn play_to_end(&mut self) -> PlayStatus {
        self.play_until(|| false)
    }

    /// Like [`GameHandle::play_to_end`], checking `should_stop` before every
    /// turn.
    pub fn play_until(&mut self, mut should_stop: impl FnMut() -> bool) -> PlayStatus {
        loop {
            if should_stop() {
                return PlayStatus::Cancelled;
            }
            match self.step() {
                StepOutcome::Finished => return PlayStatus::Finished,
                StepOutcome::AwaitingInput(seat) => return PlayStatus::AwaitingInput(seat),
                _ => {}
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn final_scores(&self) -> Option<&ScoreBoard> {
        self.state.final_scores()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner()
    }

    fn log_finish(&self) {
        if !tracing::enabled!(Level::DEBUG) {
            return;
        }
        let scores = self
            .state
            .final_scores()
            .map(|board| board.standings().to_vec())
            .unwrap_or_default();
        event!(
            target: "golf_bot::table",
            Level::DEBUG,
            seed = self.state.seed(),
            winner = ?self.state.winner().map(|id| id.index()),
            scores = ?scores,
            turns = self.state.history().len(),
            "game finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_lineups() {
        let lineup = build_lineup(&[AgentKind::Random], 1);
        assert!(matches!(
            new_game(2, lineup, 1),
            Err(LineupError::SeatCount { players: 2, agents: 1 })
        ));
        let lineup = build_lineup(&[AgentKind::Random; 7], 1);
        assert!(matches!(new_game(7, lineup, 1), Err(LineupError::Setup(_))));
    }

    #[test]
    fn seat_seeds_differ() {
        assert_ne!(seat_seed(5, 0), seat_seed(5, 1));
        assert_eq!(seat_seed(5, 1), seat_seed(5, 1));
    }

    #[test]
    fn submit_requires_a_human_seat() {
        let lineup = build_lineup(&[AgentKind::Human, AgentKind::Ev], 3);
        let mut game = new_game(2, lineup, 3).expect("game");
        let action = Action::DrawKeep { position: 0 };
        assert!(game.submit(PlayerId::new(0), action).is_ok());
        assert!(matches!(
            game.submit(PlayerId::new(1), action),
            Err(LineupError::NotHuman(_))
        ));
    }

    #[test]
    fn trajectories_only_for_recorded_seats() {
        let lineup = build_lineup(&[AgentKind::Ev, AgentKind::Random], 12);
        let mut game = new_game(2, lineup, 12).expect("game");
        game.record_trajectory(PlayerId::new(0));
        assert_eq!(game.play_to_end(), PlayStatus::Finished);
        let recorded = game.take_trajectory(PlayerId::new(0)).expect("recorded");
        assert_eq!(recorded.len(), 4);
        assert!(game.take_trajectory(PlayerId::new(1)).is_none());
    }
}
