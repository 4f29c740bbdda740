use crate::model::card::Card;
use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an attempted action was refused.
///
/// `NotYourTurn` and `GameOver` leave the game untouched. Every other variant
/// is recorded as a forfeited turn and play moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IllegalActionError {
    #[error("the game is already over")]
    GameOver,
    #[error("it is {expected}'s turn, not {actual}'s")]
    NotYourTurn { expected: PlayerId, actual: PlayerId },
    #[error("position {0} does not exist")]
    InvalidPosition(usize),
    #[error("position {0} is already face up")]
    SlotAlreadyPublic(usize),
    #[error("the discard pile is empty")]
    EmptyDiscard,
    #[error("the deck is empty")]
    EmptyDeck,
}

impl IllegalActionError {
    /// Whether the engine burned the player's turn when refusing the action.
    pub const fn consumes_turn(self) -> bool {
        !matches!(
            self,
            IllegalActionError::GameOver | IllegalActionError::NotYourTurn { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameSetupError {
    #[error("golf needs between {min} and {max} players, got {requested}")]
    PlayerCount {
        requested: usize,
        min: usize,
        max: usize,
    },
    #[error("expected {expected} cards across deck, discard and grids, found {found}")]
    CardCount { expected: usize, found: usize },
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("round {0} is outside 1..=4")]
    Round(u8),
    #[error("seat {turn} is not at a table of {players}")]
    Turn { turn: PlayerId, players: usize },
    #[error("recorded turn {index} cannot be replayed: {error}")]
    Replay {
        index: usize,
        error: IllegalActionError,
    },
}
