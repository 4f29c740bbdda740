use crate::model::rank::{RANK_COUNT, Rank};
use serde::{Deserialize, Serialize};

pub const COPIES_PER_RANK: u8 = 4;

/// Per-rank count of cards not yet seen by some observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCounts([u8; RANK_COUNT]);

impl Default for RankCounts {
    fn default() -> Self {
        Self::full()
    }
}

impl RankCounts {
    /// A fresh 52-card deck: four of each rank.
    pub const fn full() -> Self {
        Self([COPIES_PER_RANK; RANK_COUNT])
    }

    pub const fn from_raw(counts: [u8; RANK_COUNT]) -> Self {
        Self(counts)
    }

    /// Rebuilds counts from a list of cards seen so far.
    pub fn from_seen<I>(seen: I) -> Self
    where
        I: IntoIterator<Item = Rank>,
    {
        let mut counts = Self::full();
        for rank in seen {
            counts.mark_seen(rank);
        }
        counts
    }

    /// Removes one copy of `rank`. Returns `false` if none were left.
    pub fn mark_seen(&mut self, rank: Rank) -> bool {
        let slot = &mut self.0[rank.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn count(&self, rank: Rank) -> u8 {
        self.0[rank.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().map(|&c| u32::from(c)).sum()
    }

    pub fn raw(&self) -> &[u8; RANK_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rank, u8)> + '_ {
        Rank::ORDERED.iter().map(|&rank| (rank, self.count(rank)))
    }

    /// Normalised rank probabilities, or `None` when every copy has been seen.
    pub fn distribution(&self) -> Option<RankDistribution> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut probs = [0.0f64; RANK_COUNT];
        for (index, &count) in self.0.iter().enumerate() {
            probs[index] = f64::from(count) / f64::from(total);
        }
        Some(RankDistribution(probs))
    }
}

/// Probability of each rank being the next unseen card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankDistribution([f64; RANK_COUNT]);

impl RankDistribution {
    pub fn probability(&self, rank: Rank) -> f64 {
        self.0[rank.index()]
    }

    /// Ranks with non-zero probability, lowest first.
    pub fn support(&self) -> impl Iterator<Item = (Rank, f64)> + '_ {
        Rank::ORDERED
            .iter()
            .map(|&rank| (rank, self.probability(rank)))
            .filter(|(_, p)| *p > 0.0)
    }

    pub fn expected_score(&self) -> f64 {
        self.support()
            .map(|(rank, p)| p * f64::from(rank.score()))
            .sum()
    }
}
