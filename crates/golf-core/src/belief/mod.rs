//! What a seat can infer about cards it has not seen.
//!
//! - `counts`: per-rank unseen counts and the distribution derived from them.
//! - `expectation`: expected grid scores and the draw-versus-discard analysis.
//! - `odds`: informational probabilities for the next draw.

pub mod counts;
pub mod expectation;
pub mod odds;

pub use counts::{RankCounts, RankDistribution};
pub use expectation::{
    DiscardBranch, DrawBranch, EvAnalysis, EvParams, GridEvaluator, Recommendation,
    expected_score_blind, expected_value_draw_vs_discard,
};
pub use odds::{DrawOdds, draw_odds};
