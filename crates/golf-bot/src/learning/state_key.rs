//! Lossy state abstraction for the tabular learner.
//!
//! A state is the multiset of ranks the learner knows in its own grid, the rank
//! on top of the discard pile and the round. Suits and slot positions are
//! dropped. Every state has a canonical index in `0..STATE_SPACE_SIZE` so the
//! dense backend can address it directly.

use core::fmt;
use golf_core::game::action::{Action, ActionKind};
use golf_core::game::state::MAX_ROUNDS;
use golf_core::game::view::GameView;
use golf_core::model::grid::GRID_SIZE;
use golf_core::model::rank::{RANK_COUNT, Rank};
use serde::{Deserialize, Serialize};

/// Discard-top options: no card, or one of the thirteen ranks.
pub const DISCARD_OPTIONS: usize = RANK_COUNT + 1;
pub const ROUND_OPTIONS: usize = MAX_ROUNDS as usize;
pub const MULTISET_COUNT: usize = multisets_up_to(GRID_SIZE);
pub const STATE_SPACE_SIZE: usize = MULTISET_COUNT * DISCARD_OPTIONS * ROUND_OPTIONS;
pub const ACTION_SPACE_SIZE: usize = ActionKind::ALL.len() * GRID_SIZE;

const fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let mut result = 1usize;
    let mut i = 0;
    while i < k {
        result = result * (n - i) / (i + 1);
        i += 1;
    }
    result
}

/// Multisets of size exactly `k` drawn from the thirteen ranks.
const fn multisets_of_size(k: usize) -> usize {
    binomial(RANK_COUNT + k - 1, k)
}

const fn multisets_up_to(max: usize) -> usize {
    let mut total = 0;
    let mut k = 0;
    while k <= max {
        total += multisets_of_size(k);
        k += 1;
    }
    total
}

/// Closed-form count of distinct [`StateKey`]s.
pub const fn state_space_size() -> usize {
    STATE_SPACE_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "StateKeyFields")]
pub struct StateKey {
    /// Known ranks in ascending order.
    known: Vec<Rank>,
    discard_top: Option<Rank>,
    round: u8,
}

/// Wire form of [`StateKey`]; decoding goes through [`StateKey::new`].
#[derive(Deserialize)]
struct StateKeyFields {
    known: Vec<Rank>,
    discard_top: Option<Rank>,
    round: u8,
}

impl From<StateKeyFields> for StateKey {
    fn from(fields: StateKeyFields) -> Self {
        StateKey::new(fields.known, fields.discard_top, fields.round)
    }
}

impl StateKey {
    pub fn new(mut known: Vec<Rank>, discard_top: Option<Rank>, round: u8) -> Self {
        known.truncate(GRID_SIZE);
        known.sort();
        let round = round.clamp(1, MAX_ROUNDS);
        Self {
            known,
            discard_top,
            round,
        }
    }

    /// Key for the viewer's own grid. Spectator views produce an all-unknown grid.
    pub fn from_view(view: &GameView) -> Self {
        let known = view
            .own_grid()
            .map(|grid| grid.known_ranks().iter().flatten().copied().collect())
            .unwrap_or_default();
        Self::new(known, view.discard_top.map(|card| card.rank), view.round)
    }

    pub fn known(&self) -> &[Rank] {
        &self.known
    }

    pub fn unknown_count(&self) -> usize {
        GRID_SIZE - self.known.len()
    }

    pub fn discard_top(&self) -> Option<Rank> {
        self.discard_top
    }

    pub fn round(&self) -> u8 {
        self.round
    }

    /// Canonical index in `0..STATE_SPACE_SIZE`.
    pub fn index(&self) -> usize {
        let multiset = multiset_rank(&self.known);
        let discard = self.discard_top.map_or(0, |rank| rank.index() + 1);
        (multiset * DISCARD_OPTIONS + discard) * ROUND_OPTIONS + usize::from(self.round - 1)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index >= STATE_SPACE_SIZE {
            return None;
        }
        let round = (index % ROUND_OPTIONS) as u8 + 1;
        let rest = index / ROUND_OPTIONS;
        let discard = rest % DISCARD_OPTIONS;
        let multiset = rest / DISCARD_OPTIONS;
        let discard_top = if discard == 0 {
            None
        } else {
            Rank::from_index(discard - 1)
        };
        Some(Self {
            known: multiset_unrank(multiset)?,
            discard_top,
            round,
        })
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known = self
            .known
            .iter()
            .map(|rank| rank.symbol())
            .collect::<Vec<_>>()
            .join(",");
        let discard = self.discard_top.map_or("none", Rank::symbol);
        write!(f, "({known})_{}_{discard}_{}", self.unknown_count(), self.round)
    }
}

/// Ranks a sorted multiset with the combinatorial number system: the sorted
/// values `r_i` become strictly increasing `c_i = r_i + i`, ranked as
/// `sum C(c_i, i + 1)`, offset by the count of all smaller multisets.
fn multiset_rank(sorted: &[Rank]) -> usize {
    let offset: usize = (0..sorted.len()).map(multisets_of_size).sum();
    let within: usize = sorted
        .iter()
        .enumerate()
        .map(|(i, rank)| binomial(rank.index() + i, i + 1))
        .sum();
    offset + within
}

fn multiset_unrank(mut index: usize) -> Option<Vec<Rank>> {
    let mut size = 0;
    while index >= multisets_of_size(size) {
        index -= multisets_of_size(size);
        size += 1;
        if size > GRID_SIZE {
            return None;
        }
    }
    let mut ranks = vec![Rank::Ace; size];
    // Largest element first: pick the biggest c with C(c, i+1) <= remaining.
    let mut upper = RANK_COUNT + size - 1;
    for i in (0..size).rev() {
        let mut c = upper;
        while binomial(c, i + 1) > index {
            c -= 1;
        }
        index -= binomial(c, i + 1);
        ranks[i] = Rank::from_index(c - i)?;
        upper = c;
    }
    Some(ranks)
}

/// `(action family, grid position)`, the learner's action abstraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionKey {
    pub kind: ActionKind,
    pub position: usize,
}

impl ActionKey {
    pub const fn of(action: Action) -> Self {
        Self {
            kind: action.kind(),
            position: action.position(),
        }
    }

    pub const fn index(self) -> usize {
        self.kind.index() * GRID_SIZE + self.position
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match ActionKind::from_index(index / GRID_SIZE) {
            Some(kind) => Some(Self {
                kind,
                position: index % GRID_SIZE,
            }),
            None => None,
        }
    }

    pub const fn to_action(self) -> Action {
        Action::from_parts(self.kind, self.position)
    }
}

impl From<Action> for ActionKey {
    fn from(action: Action) -> Self {
        Self::of(action)
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn decoded_keys_are_canonical() {
        let json = r#"{"known":["King","Two","Ace","Two"],"discard_top":null,"round":0}"#;
        let key: StateKey = serde_json::from_str(json).expect("decode");
        assert_eq!(key.known(), &[Rank::Ace, Rank::Two, Rank::Two, Rank::King]);
        assert_eq!(key.round(), 1);
        assert!(key.index() < STATE_SPACE_SIZE);
        let encoded = serde_json::to_string(&key).expect("encode");
        assert_eq!(serde_json::from_str::<StateKey>(&encoded).expect("decode"), key);
    }

    #[test]
    fn closed_form_state_space() {
        assert_eq!(MULTISET_COUNT, 1 + 13 + 91 + 455 + 1820);
        assert_eq!(state_space_size(), 2380 * 14 * 4);
        assert_eq!(ACTION_SPACE_SIZE, 12);
    }

    #[test]
    fn display_matches_compact_format() {
        let key = StateKey::new(vec![Rank::Jack, Rank::Two, Rank::Seven], Some(Rank::Ace), 4);
        assert_eq!(key.to_string(), "(2,7,J)_1_A_4");
        let empty = StateKey::new(Vec::new(), None, 1);
        assert_eq!(empty.to_string(), "()_4_none_1");
    }

    #[test]
    fn index_is_a_bijection() {
        let mut seen = HashSet::new();
        for index in 0..STATE_SPACE_SIZE {
            let key = StateKey::from_index(index).expect("in range");
            assert_eq!(key.index(), index);
            assert!(seen.insert(key));
        }
        assert!(StateKey::from_index(STATE_SPACE_SIZE).is_none());
    }

    #[test]
    fn extreme_multisets_sit_at_the_ends() {
        assert_eq!(StateKey::new(Vec::new(), None, 1).index(), 0);
        let kings = StateKey::new(vec![Rank::King; 4], Some(Rank::King), 4);
        assert_eq!(kings.index(), STATE_SPACE_SIZE - 1);
    }

    #[test]
    fn action_key_indices_cover_twelve_slots() {
        let indices: HashSet<_> = ActionKind::ALL
            .iter()
            .flat_map(|&kind| (0..GRID_SIZE).map(move |position| ActionKey { kind, position }))
            .map(ActionKey::index)
            .collect();
        assert_eq!(indices.len(), ACTION_SPACE_SIZE);
        assert!(indices.iter().all(|&i| i < ACTION_SPACE_SIZE));
        let key = ActionKey::of(Action::DrawDiscardAndFlip { flip_position: 3 });
        assert_eq!(ActionKey::from_index(key.index()), Some(key));
        assert_eq!(key.to_string(), "draw_discard_flip:3");
    }
}
