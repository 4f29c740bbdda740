use super::qtable::QStore;
use super::trajectory::Trajectory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningRates {
    /// Step size `alpha`.
    pub learning_rate: f32,
    /// Discount `gamma`.
    pub discount_factor: f32,
}

impl Default for LearningRates {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
        }
    }
}

/// One-step Q-learning over a finished trajectory:
/// `Q[s,a] += alpha * (r + gamma * max Q[s', .] - Q[s,a])`.
///
/// `s'` is the next recorded state; the last step bootstraps from zero.
/// Unexplored cells start at zero. Returns the summed absolute TD error.
pub fn apply_trajectory<S: QStore + ?Sized>(
    table: &mut S,
    trajectory: &Trajectory,
    rewards: &[f32],
    rates: LearningRates,
) -> f32 {
    let steps = trajectory.steps();
    debug_assert_eq!(steps.len(), rewards.len());
    let mut total_error = 0.0;
    for (i, (step, &reward)) in steps.iter().zip(rewards).enumerate() {
        let next_max = steps
            .get(i + 1)
            .map_or(0.0, |next| table.max_value(&next.state_key));
        let current = table.get(&step.state_key, step.action_key).unwrap_or(0.0);
        let td_error = reward + rates.discount_factor * next_max - current;
        table.set(
            &step.state_key,
            step.action_key,
            current + rates.learning_rate * td_error,
        );
        total_error += td_error.abs();
    }
    total_error
}

#[cfg(test)]
mod tests {
    use super::{LearningRates, apply_trajectory};
    use crate::learning::qtable::{QStore, SparseQTable};
    use crate::learning::state_key::ActionKey;
    use crate::learning::trajectory::Trajectory;
    use golf_core::game::action::Action;
    use golf_core::game::state::GameState;
    use golf_core::model::player::PlayerId;

    fn two_step_trajectory() -> Trajectory {
        let mut state = GameState::with_seed(2, 12).expect("deal");
        let mut trajectory = Trajectory::new();
        let first = Action::DrawKeep { position: 0 };
        trajectory.record(&state.view_for(PlayerId::new(0)), first);
        state.apply(PlayerId::new(0), first).expect("legal");
        state
            .apply(PlayerId::new(1), Action::DrawKeep { position: 0 })
            .expect("legal");
        trajectory.record(
            &state.view_for(PlayerId::new(0)),
            Action::DrawDiscardAndFlip { flip_position: 1 },
        );
        trajectory
    }

    #[test]
    fn terminal_step_bootstraps_from_zero() {
        let trajectory = two_step_trajectory();
        let mut table = SparseQTable::new();
        apply_trajectory(&mut table, &trajectory, &[0.1, 2.1], LearningRates::default());

        let last = &trajectory.steps()[1];
        let first = &trajectory.steps()[0];
        // Last: 0 + 0.1 * (2.1 - 0) = 0.21
        let last_value = table.get(&last.state_key, last.action_key).expect("written");
        assert!((last_value - 0.21).abs() < 1e-6);
        // The successor was still unexplored when the first step was applied.
        let first_value = table.get(&first.state_key, first.action_key).expect("written");
        assert!((first_value - 0.01).abs() < 1e-6);
    }

    #[test]
    fn repeated_updates_use_the_successor_max() {
        let trajectory = two_step_trajectory();
        let mut table = SparseQTable::new();
        let rates = LearningRates::default();
        apply_trajectory(&mut table, &trajectory, &[0.1, 2.1], rates);
        apply_trajectory(&mut table, &trajectory, &[0.1, 2.1], rates);

        let first = &trajectory.steps()[0];
        // 0.01 + 0.1 * (0.1 + 0.9 * 0.21 - 0.01)
        let expected = 0.01 + 0.1 * (0.1 + 0.9 * 0.21 - 0.01);
        let value = table
            .get(&first.state_key, ActionKey::of(first.action))
            .expect("written");
        assert!((value - expected).abs() < 1e-6);
    }
}
