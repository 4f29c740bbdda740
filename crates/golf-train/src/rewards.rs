//! Reward shaping for the learner's trajectory.

use serde::{Deserialize, Serialize};

pub const WIN_BONUS: f32 = 10.0;

/// `(upper score bound, bonus)` for a losing learner, checked in order.
pub const LOSS_BUCKETS: [(i32, f32); 3] = [(5, 2.0), (10, 0.0), (15, -2.0)];
pub const LOSS_FLOOR: f32 = -5.0;

/// Every decision earns `step_reward`; the last one also carries the
/// episode's outcome bonus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardShaping {
    pub step_reward: f32,
}

impl Default for RewardShaping {
    fn default() -> Self {
        Self { step_reward: 0.1 }
    }
}

impl RewardShaping {
    pub fn new(step_reward: f32) -> Self {
        Self { step_reward }
    }

    /// Outcome bonus: a flat win bonus, otherwise bucketed on the final score.
    pub fn terminal_bonus(&self, won: bool, score: i32) -> f32 {
        if won {
            return WIN_BONUS;
        }
        LOSS_BUCKETS
            .iter()
            .find(|(bound, _)| score <= *bound)
            .map_or(LOSS_FLOOR, |&(_, bonus)| bonus)
    }

    /// Per-step rewards for a trajectory of `steps` decisions.
    pub fn rewards(&self, steps: usize, won: bool, score: i32) -> Vec<f32> {
        let mut rewards = vec![self.step_reward; steps];
        if let Some(last) = rewards.last_mut() {
            *last += self.terminal_bonus(won, score);
        }
        rewards
    }
}
