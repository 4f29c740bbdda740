use core::fmt;
use serde::{Deserialize, Serialize};

/// Seat index at the table. Seat 0 acts first in every round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(usize);

impl PlayerId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }

    /// Next seat clockwise, wrapping at `num_players`.
    pub const fn next(self, num_players: usize) -> PlayerId {
        PlayerId((self.0 + 1) % num_players)
    }

    pub fn all(num_players: usize) -> impl Iterator<Item = PlayerId> {
        (0..num_players).map(PlayerId)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::PlayerId;

    #[test]
    fn next_wraps_around() {
        assert_eq!(PlayerId::new(1).next(2), PlayerId::new(0));
        assert_eq!(PlayerId::new(2).next(4), PlayerId::new(3));
    }

    #[test]
    fn display_is_one_based() {
        assert_eq!(PlayerId::new(0).to_string(), "P1");
    }

    #[test]
    fn all_enumerates_seats_in_order() {
        let seats: Vec<_> = PlayerId::all(3).map(PlayerId::index).collect();
        assert_eq!(seats, vec![0, 1, 2]);
    }
}
