use crate::belief::expectation::GridEvaluator;
use crate::game::view::GameView;
use crate::model::player::PlayerId;
use crate::model::rank::Rank;
use serde::{Deserialize, Serialize};

/// Chances for the next deck card, from one seat's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawOdds {
    /// Scores strictly below the seat's cheapest known card.
    pub lower_than_min: f64,
    /// Matches the rank of any known card in the grid.
    pub pairs_known: f64,
    /// Some swap would lower the seat's expected score.
    pub improves: f64,
}

pub fn draw_odds(view: &GameView, seat: PlayerId) -> DrawOdds {
    if view.deck_size == 0 {
        return DrawOdds::default();
    }
    let Some(evaluator) = GridEvaluator::for_seat(view, seat) else {
        return DrawOdds::default();
    };
    let Some(dist) = evaluator.distribution() else {
        return DrawOdds::default();
    };

    let known: Vec<Rank> = evaluator.ranks().iter().flatten().copied().collect();
    let min_known = known.iter().map(|rank| rank.score()).min();

    let mut odds = DrawOdds::default();
    for (rank, p) in dist.support() {
        if min_known.is_some_and(|min| rank.score() < min) {
            odds.lower_than_min += p;
        }
        if known.contains(&rank) {
            odds.pairs_known += p;
        }
        if evaluator.best_swap(rank).is_some_and(|(_, delta)| delta < 0.0) {
            odds.improves += p;
        }
    }
    odds
}
