use super::action::Action;
use super::error::GameSetupError;
use super::state::GameState;
use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedTurn {
    pub player: PlayerId,
    pub action: Option<Action>,
}

/// Seed plus the sequence of attempted moves. Replaying it through the engine
/// reproduces the game exactly, forfeits included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub seed: u64,
    pub num_players: usize,
    pub turns: Vec<RecordedTurn>,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        GameSnapshot {
            seed: state.seed(),
            num_players: state.num_players(),
            turns: state
                .history()
                .iter()
                .map(|record| RecordedTurn {
                    player: record.player,
                    action: record.action,
                })
                .collect(),
        }
    }

    pub fn restore(&self) -> Result<GameState, GameSetupError> {
        let mut state = GameState::with_seed(self.num_players, self.seed)?;
        for (index, turn) in self.turns.iter().enumerate() {
            let replayed = match turn.action {
                Some(action) => state.apply(turn.player, action).map(|_| ()),
                None => state.pass_turn(turn.player),
            };
            // Forfeits replay as forfeits. Anything the engine refused outright
            // was never recorded, so the snapshot is corrupt.
            match replayed {
                Err(error) if !error.consumes_turn() => {
                    return Err(GameSetupError::Replay { index, error });
                }
                _ => {}
            }
        }
        Ok(state)
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::GameSnapshot;
    use super::RecordedTurn;
    use crate::game::action::Action;
    use crate::game::error::{GameSetupError, IllegalActionError};
    use crate::game::state::GameState;
    use crate::model::player::PlayerId;

    #[test]
    fn snapshot_serializes_to_json() {
        let state = GameState::with_seed(2, 99).expect("deal");
        let json = GameSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"seed\": 99"));
        assert!(json.contains("\"num_players\": 2"));
    }

    #[test]
    fn restore_replays_history_including_forfeits() {
        let mut state = GameState::with_seed(3, 123).expect("deal");
        state
            .apply(PlayerId::new(0), Action::DrawKeep { position: 1 })
            .unwrap();
        state
            .apply(PlayerId::new(1), Action::TakeDiscard { position: 0 })
            .unwrap();
        state.pass_turn(PlayerId::new(2)).unwrap();
        let _ = state.apply(PlayerId::new(0), Action::DrawKeep { position: 1 });

        let json = GameSnapshot::to_json(&state).unwrap();
        let restored = GameSnapshot::from_json(&json).unwrap().restore().unwrap();
        assert_eq!(restored.grids(), state.grids());
        assert_eq!(restored.discard_pile(), state.discard_pile());
        assert_eq!(restored.history(), state.history());
        assert_eq!(restored.current_player(), state.current_player());
        assert_eq!(restored.round(), state.round());
    }

    #[test]
    fn restore_rejects_turns_the_engine_never_accepted() {
        let mut snapshot = GameSnapshot::capture(&GameState::with_seed(2, 17).expect("deal"));
        snapshot.turns.push(RecordedTurn {
            player: PlayerId::new(1),
            action: Some(Action::DrawKeep { position: 0 }),
        });
        assert_eq!(
            snapshot.restore().err(),
            Some(GameSetupError::Replay {
                index: 0,
                error: IllegalActionError::NotYourTurn {
                    expected: PlayerId::new(0),
                    actual: PlayerId::new(1),
                },
            })
        );

        let mut state = GameState::with_seed(2, 17).expect("deal");
        for _ in 0..8 {
            let player = state.current_player();
            state.pass_turn(player).expect("pass");
        }
        let mut snapshot = GameSnapshot::capture(&state);
        snapshot.turns.push(RecordedTurn {
            player: PlayerId::new(0),
            action: None,
        });
        assert!(matches!(
            snapshot.restore(),
            Err(GameSetupError::Replay {
                index: 8,
                error: IllegalActionError::GameOver,
            })
        ));
    }
}
