//! Expected grid scores under partial information, and the draw-versus-discard
//! comparison built on top of them.
//!
//! Everything here works from what one seat can legitimately know: its own
//! public and privately visible cards, the discard pile and every other public
//! card. Hidden slots are valued in expectation over the ranks that seat has
//! not seen.

use crate::belief::counts::RankDistribution;
use crate::game::view::GameView;
use crate::model::grid::GRID_SIZE;
use crate::model::player::PlayerId;
use crate::model::rank::Rank;
use crate::model::score::score_ranks;
use serde::{Deserialize, Serialize};

/// Advantage below which drawing is recommended (and above whose negation
/// taking the discard is).
pub const INDIFFERENCE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvParams {
    /// Subtracted from the value of a flip, so positive values favour revealing.
    pub flip_bonus: f64,
}

impl Default for EvParams {
    fn default() -> Self {
        Self { flip_bonus: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Draw,
    Discard,
    /// Within the threshold either way; drawing is slightly preferred.
    NearIndifferent,
    /// Neither source is usable, or there is nothing left to target.
    NoMove,
}

impl Recommendation {
    pub const fn prefers_draw(self) -> bool {
        matches!(self, Recommendation::Draw | Recommendation::NearIndifferent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscardBranch {
    /// Change in expected score from swapping the discard top into `position`.
    pub ev: f64,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawBranch {
    /// Expected change if the best response is chosen after seeing the card.
    pub ev: f64,
    /// Expected change from committing to keep at `keep_position` blind.
    pub expected_keep: f64,
    pub keep_position: usize,
    /// Change from discarding the draw and flipping `flip_position`.
    pub flip_ev: f64,
    pub flip_position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvAnalysis {
    pub current: f64,
    pub discard: Option<DiscardBranch>,
    pub draw: Option<DrawBranch>,
    /// `draw.ev - discard.ev` when both branches exist, otherwise zero.
    pub advantage: f64,
    pub recommendation: Recommendation,
}

impl EvAnalysis {
    pub fn empty(current: f64) -> Self {
        Self {
            current,
            discard: None,
            draw: None,
            advantage: 0.0,
            recommendation: Recommendation::NoMove,
        }
    }
}

/// Expected score of a grid whose unknown slots are drawn from `dist`. Pairs
/// only count when both cards are known.
pub fn expected_score_blind(
    ranks: &[Option<Rank>; GRID_SIZE],
    dist: Option<&RankDistribution>,
) -> f64 {
    let unknown = ranks.iter().filter(|rank| rank.is_none()).count();
    let per_unknown = dist.map(RankDistribution::expected_score).unwrap_or(0.0);
    f64::from(score_ranks(ranks)) + unknown as f64 * per_unknown
}

/// Scores hypothetical changes to one seat's grid.
#[derive(Debug, Clone)]
pub struct GridEvaluator {
    ranks: [Option<Rank>; GRID_SIZE],
    available: Vec<usize>,
    dist: Option<RankDistribution>,
    current: f64,
}

impl GridEvaluator {
    pub fn new(
        ranks: [Option<Rank>; GRID_SIZE],
        available: Vec<usize>,
        dist: Option<RankDistribution>,
    ) -> Self {
        let current = expected_score_blind(&ranks, dist.as_ref());
        Self {
            ranks,
            available,
            dist,
            current,
        }
    }

    /// Evaluator for `seat` as that seat sees the table.
    pub fn for_seat(view: &GameView, seat: PlayerId) -> Option<Self> {
        let grid = view.grid(seat)?;
        let counts = if view.seat() == Some(seat) {
            view.unseen
        } else {
            view.public_unseen
        };
        Some(Self::new(
            grid.known_ranks(),
            grid.available_positions(),
            counts.distribution(),
        ))
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn ranks(&self) -> &[Option<Rank>; GRID_SIZE] {
        &self.ranks
    }

    pub fn available(&self) -> &[usize] {
        &self.available
    }

    pub fn distribution(&self) -> Option<&RankDistribution> {
        self.dist.as_ref()
    }

    fn blind(&self, ranks: &[Option<Rank>; GRID_SIZE]) -> f64 {
        expected_score_blind(ranks, self.dist.as_ref())
    }

    /// Change in expected score from putting `rank` at `position`.
    pub fn swap_delta(&self, position: usize, rank: Rank) -> f64 {
        let mut next = self.ranks;
        next[position] = Some(rank);
        self.blind(&next) - self.current
    }

    /// Best swap position for `rank`; ties keep the lowest position.
    pub fn best_swap(&self, rank: Rank) -> Option<(usize, f64)> {
        best_by(&self.available, |pos| self.swap_delta(pos, rank))
    }

    /// Change in expected score from turning `position` face up. A card the
    /// owner already knows gains nothing; a hidden one is averaged over its
    /// possible ranks.
    pub fn flip_delta(&self, position: usize) -> f64 {
        if self.ranks[position].is_some() {
            return 0.0;
        }
        let Some(dist) = self.dist.as_ref() else {
            return 0.0;
        };
        dist.support()
            .map(|(rank, p)| p * self.swap_delta(position, rank))
            .sum()
    }

    /// Expected change from keeping an unseen draw at `position`.
    pub fn keep_delta(&self, position: usize) -> Option<f64> {
        let dist = self.dist.as_ref()?;
        Some(
            dist.support()
                .map(|(rank, p)| p * self.swap_delta(position, rank))
                .sum(),
        )
    }

    pub fn analyze(
        &self,
        discard_top: Option<Rank>,
        deck_nonempty: bool,
        params: &EvParams,
    ) -> EvAnalysis {
        if self.available.is_empty() {
            return EvAnalysis::empty(self.current);
        }

        let discard = discard_top
            .and_then(|rank| self.best_swap(rank))
            .map(|(position, ev)| DiscardBranch { ev, position });

        let draw = if deck_nonempty { self.draw_branch(params) } else { None };

        let (advantage, recommendation) = match (&draw, &discard) {
            (Some(draw), Some(discard)) => {
                let advantage = draw.ev - discard.ev;
                let recommendation = if advantage < -INDIFFERENCE_THRESHOLD {
                    Recommendation::Draw
                } else if advantage > INDIFFERENCE_THRESHOLD {
                    Recommendation::Discard
                } else {
                    Recommendation::NearIndifferent
                };
                (advantage, recommendation)
            }
            (Some(_), None) => (0.0, Recommendation::Draw),
            (None, Some(_)) => (0.0, Recommendation::Discard),
            (None, None) => (0.0, Recommendation::NoMove),
        };

        EvAnalysis {
            current: self.current,
            discard,
            draw,
            advantage,
            recommendation,
        }
    }

    fn draw_branch(&self, params: &EvParams) -> Option<DrawBranch> {
        let dist = self.dist.as_ref()?;
        let (flip_position, flip_ev) =
            best_by(&self.available, |pos| self.flip_delta(pos) - params.flip_bonus)?;
        let (keep_position, expected_keep) =
            best_by(&self.available, |pos| self.keep_delta(pos).unwrap_or(0.0))?;

        let ev = dist
            .support()
            .map(|(rank, p)| {
                let swap = self.best_swap(rank).map_or(f64::INFINITY, |(_, delta)| delta);
                p * swap.min(flip_ev)
            })
            .sum();

        Some(DrawBranch {
            ev,
            expected_keep,
            keep_position,
            flip_ev,
            flip_position,
        })
    }
}

fn best_by<F>(positions: &[usize], mut value: F) -> Option<(usize, f64)>
where
    F: FnMut(usize) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for &pos in positions {
        let v = value(pos);
        if best.is_none_or(|(_, current)| v < current) {
            best = Some((pos, v));
        }
    }
    best
}

/// Compares drawing from the deck against taking the discard for `seat`.
///
/// Returns [`EvAnalysis::empty`] when the seat has no open position or
/// neither pile has a card.
pub fn expected_value_draw_vs_discard(
    view: &GameView,
    seat: PlayerId,
    params: &EvParams,
) -> EvAnalysis {
    let Some(evaluator) = GridEvaluator::for_seat(view, seat) else {
        return EvAnalysis::empty(0.0);
    };
    evaluator.analyze(
        view.discard_top.map(|card| card.rank),
        view.deck_size > 0,
        params,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::counts::RankCounts;

    fn uniform() -> Option<RankDistribution> {
        RankCounts::full().distribution()
    }

    #[test]
    fn blind_score_adds_expected_unknowns() {
        let ranks = [None, None, Some(Rank::Five), Some(Rank::Five)];
        let dist = uniform();
        let expected = 2.0 * 75.0 / 13.0;
        assert!((expected_score_blind(&ranks, dist.as_ref()) - expected).abs() < 1e-9);
    }

    #[test]
    fn swapping_into_a_pair_scores_negative() {
        let eval = GridEvaluator::new(
            [None, None, Some(Rank::Nine), Some(Rank::Four)],
            vec![0, 1, 2, 3],
            uniform(),
        );
        // Into slot 3 the nines pair (13 -> 0). Into slot 0 they pair as well and
        // an unknown slot disappears, which is better still.
        assert!((eval.swap_delta(3, Rank::Nine) + 13.0).abs() < 1e-9);
        let (pos, delta) = eval.best_swap(Rank::Nine).expect("positions");
        assert_eq!(pos, 0);
        assert!((delta - (-9.0 - 75.0 / 13.0)).abs() < 1e-9);
    }

    #[test]
    fn flipping_a_known_card_is_free() {
        let eval = GridEvaluator::new(
            [None, Some(Rank::Two), Some(Rank::King), Some(Rank::Ace)],
            vec![0, 2, 3],
            uniform(),
        );
        assert_eq!(eval.flip_delta(2), 0.0);
        // A hidden flip can only help by landing a pair.
        assert!(eval.flip_delta(0) < 0.0);
    }

    #[test]
    fn no_positions_yields_empty_analysis() {
        let eval = GridEvaluator::new([Some(Rank::Two); 4], Vec::new(), uniform());
        let analysis = eval.analyze(Some(Rank::Ace), true, &EvParams::default());
        assert_eq!(analysis.recommendation, Recommendation::NoMove);
        assert!(analysis.draw.is_none() && analysis.discard.is_none());
        assert_eq!(analysis.advantage, 0.0);
    }

    #[test]
    fn missing_piles_force_the_other_branch() {
        let eval = GridEvaluator::new(
            [None, None, Some(Rank::Queen), Some(Rank::Three)],
            vec![0, 1, 2, 3],
            uniform(),
        );
        let params = EvParams::default();
        assert_eq!(eval.analyze(None, true, &params).recommendation, Recommendation::Draw);
        assert_eq!(
            eval.analyze(Some(Rank::Jack), false, &params).recommendation,
            Recommendation::Discard
        );
        assert_eq!(eval.analyze(None, false, &params).recommendation, Recommendation::NoMove);
    }

    #[test]
    fn low_discard_is_preferred_over_a_blind_draw() {
        let eval = GridEvaluator::new(
            [Some(Rank::King), Some(Rank::Queen), Some(Rank::King), Some(Rank::Queen)],
            vec![0, 1, 2, 3],
            uniform(),
        );
        // Grid is K Q K Q: (0,2) and (1,3) pair, score 0. A jack anywhere breaks a pair.
        assert_eq!(eval.current(), 0.0);
        let analysis = eval.analyze(Some(Rank::Jack), true, &EvParams::default());
        let discard = analysis.discard.expect("discard branch");
        assert!(discard.ev > 0.0);
    }

    #[test]
    fn flip_bonus_makes_flipping_more_attractive() {
        let eval = GridEvaluator::new(
            [None, Some(Rank::Seven), Some(Rank::Eight), Some(Rank::Six)],
            vec![0, 2, 3],
            uniform(),
        );
        let plain = eval.analyze(None, true, &EvParams::default()).draw.expect("draw");
        let bonus = eval
            .analyze(None, true, &EvParams { flip_bonus: 2.0 })
            .draw
            .expect("draw");
        assert!((plain.flip_ev - bonus.flip_ev - 2.0).abs() < 1e-9);
        assert!(bonus.ev <= plain.ev);
    }
}
