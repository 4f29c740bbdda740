use crate::model::card::Card;
use crate::model::grid::GRID_SIZE;
use crate::model::player::PlayerId;
use crate::model::rank::Rank;
use serde::{Deserialize, Serialize};

/// Unordered slot pairs in the order the pair matcher scans them.
pub const PAIR_ORDER: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

/// Greedy pair matcher: the first untouched pair of equal ranks in
/// [`PAIR_ORDER`] wins, both slots are consumed, scanning continues.
///
/// This is not a maximum matching. Three of a kind cancels exactly one pair,
/// and which pair depends on slot order alone.
pub fn find_pairs(ranks: &[Option<Rank>; GRID_SIZE]) -> Vec<(usize, usize)> {
    let mut used = [false; GRID_SIZE];
    let mut pairs = Vec::new();
    for (a, b) in PAIR_ORDER {
        if used[a] || used[b] {
            continue;
        }
        match (ranks[a], ranks[b]) {
            (Some(left), Some(right)) if left == right => {
                used[a] = true;
                used[b] = true;
                pairs.push((a, b));
            }
            _ => {}
        }
    }
    pairs
}

/// Scores a grid where some slots may be unknown. Unknown slots add nothing
/// and never pair.
pub fn score_ranks(ranks: &[Option<Rank>; GRID_SIZE]) -> i32 {
    let total: i32 = ranks.iter().flatten().map(|rank| rank.score()).sum();
    let cancelled: i32 = find_pairs(ranks)
        .into_iter()
        .filter_map(|(a, _)| ranks[a])
        .map(|rank| rank.score() * 2)
        .sum();
    total - cancelled
}

pub fn score_cards(cards: &[Card; GRID_SIZE]) -> i32 {
    score_ranks(&cards.map(|card| Some(card.rank)))
}

pub fn score_partial(cards: &[Option<Card>; GRID_SIZE]) -> i32 {
    score_ranks(&cards.map(|card| card.map(|c| c.rank)))
}

/// Final standings for one game. Lower is better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    totals: Vec<i32>,
}

impl ScoreBoard {
    pub fn new(totals: Vec<i32>) -> Self {
        Self { totals }
    }

    pub fn score(&self, player: PlayerId) -> i32 {
        self.totals.get(player.index()).copied().unwrap_or_default()
    }

    pub fn standings(&self) -> &[i32] {
        &self.totals
    }

    /// Lowest score wins; ties go to the earliest seat.
    pub fn winner(&self) -> Option<PlayerId> {
        self.totals
            .iter()
            .enumerate()
            .min_by_key(|(index, score)| (**score, *index))
            .map(|(index, _)| PlayerId::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::suit::Suit;

    fn cards(ranks: [Rank; 4]) -> [Card; 4] {
        [
            Card::new(ranks[0], Suit::Spades),
            Card::new(ranks[1], Suit::Hearts),
            Card::new(ranks[2], Suit::Diamonds),
            Card::new(ranks[3], Suit::Clubs),
        ]
    }

    #[test]
    fn two_pairs_cancel_completely() {
        let grid = cards([Rank::Two, Rank::Two, Rank::Seven, Rank::Seven]);
        assert_eq!(score_cards(&grid), 0);
    }

    #[test]
    fn no_pairs_sum_face_values() {
        let grid = cards([Rank::Ace, Rank::Two, Rank::Three, Rank::Four]);
        assert_eq!(score_cards(&grid), 10);
    }

    #[test]
    fn three_of_a_kind_cancels_one_pair_only() {
        // 5 + 5 + 5 + 10, less the one cancelled pair of fives.
        let grid = cards([Rank::Five, Rank::Five, Rank::Five, Rank::King]);
        assert_eq!(score_cards(&grid), 15);
        let ranks = grid.map(|c| Some(c.rank));
        assert_eq!(find_pairs(&ranks), vec![(0, 1)]);
    }

    #[test]
    fn matcher_is_order_dependent() {
        // Slots 0 and 3 pair first, leaving 1 and 2 to pair with each other.
        let ranks = [Some(Rank::Nine), Some(Rank::Four), Some(Rank::Four), Some(Rank::Nine)];
        assert_eq!(find_pairs(&ranks), vec![(0, 3), (1, 2)]);
        // Four of a kind: (0,1) then (2,3).
        let quads = [Some(Rank::Six); 4];
        assert_eq!(find_pairs(&quads), vec![(0, 1), (2, 3)]);
        assert_eq!(score_ranks(&quads), 0);
    }

    #[test]
    fn triple_keeps_the_late_slot() {
        let ranks = [Some(Rank::King), Some(Rank::Two), Some(Rank::King), Some(Rank::King)];
        assert_eq!(find_pairs(&ranks), vec![(0, 2)]);
        assert_eq!(score_ranks(&ranks), 12);
    }

    #[test]
    fn unknown_slots_never_pair() {
        let ranks = [Some(Rank::Eight), None, None, Some(Rank::Three)];
        assert_eq!(score_ranks(&ranks), 11);
        let all_unknown = [None; 4];
        assert_eq!(score_ranks(&all_unknown), 0);
    }

    #[test]
    fn winner_is_lowest_then_earliest_seat() {
        let board = ScoreBoard::new(vec![12, 4, 4, 20]);
        assert_eq!(board.winner(), Some(PlayerId::new(1)));
        assert_eq!(board.score(PlayerId::new(3)), 20);
        assert_eq!(ScoreBoard::new(Vec::new()).winner(), None);
    }
}
