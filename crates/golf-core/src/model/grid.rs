use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::score::score_cards;
use serde::{Deserialize, Serialize};

pub const GRID_SIZE: usize = 4;

/// Slots dealt privately visible to their owner (the bottom row of the 2x2 grid).
pub const PRIVATE_AT_DEAL: [usize; 2] = [2, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Unknown to everyone, owner included.
    Hidden,
    /// Known to the owner only.
    PrivatelyVisible,
    /// Face up for the whole table.
    Public,
}

impl Visibility {
    pub const fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }

    pub const fn visible_to_owner(self) -> bool {
        !matches!(self, Visibility::Hidden)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub card: Card,
    pub visibility: Visibility,
}

/// A player's four cards laid out as `[TL, TR, BL, BR]`.
///
/// Visibility only ever moves towards [`Visibility::Public`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGrid {
    slots: [Slot; GRID_SIZE],
}

impl PlayerGrid {
    /// Deals a fresh grid: top row hidden, bottom row privately visible.
    pub fn dealt(cards: [Card; GRID_SIZE]) -> Self {
        let slots = std::array::from_fn(|pos| Slot {
            card: cards[pos],
            visibility: if PRIVATE_AT_DEAL.contains(&pos) {
                Visibility::PrivatelyVisible
            } else {
                Visibility::Hidden
            },
        });
        Self { slots }
    }

    pub fn with_visibility(cards: [Card; GRID_SIZE], visibility: [Visibility; GRID_SIZE]) -> Self {
        let slots = std::array::from_fn(|pos| Slot {
            card: cards[pos],
            visibility: visibility[pos],
        });
        Self { slots }
    }

    pub fn slot(&self, position: usize) -> Option<&Slot> {
        self.slots.get(position)
    }

    pub fn slots(&self) -> &[Slot; GRID_SIZE] {
        &self.slots
    }

    pub fn card(&self, position: usize) -> Option<Card> {
        self.slots.get(position).map(|slot| slot.card)
    }

    pub fn visibility(&self, position: usize) -> Option<Visibility> {
        self.slots.get(position).map(|slot| slot.visibility)
    }

    pub fn cards(&self) -> [Card; GRID_SIZE] {
        std::array::from_fn(|pos| self.slots[pos].card)
    }

    /// Positions that can still be targeted by an action.
    pub fn available_positions(&self) -> Vec<usize> {
        (0..GRID_SIZE)
            .filter(|&pos| !self.slots[pos].visibility.is_public())
            .collect()
    }

    pub fn is_fully_public(&self) -> bool {
        self.slots.iter().all(|slot| slot.visibility.is_public())
    }

    /// Turns a slot face up. Returns the card if it was not already public.
    pub fn reveal(&mut self, position: usize) -> Option<Card> {
        let slot = self.slots.get_mut(position)?;
        if slot.visibility.is_public() {
            return None;
        }
        slot.visibility = Visibility::Public;
        Some(slot.card)
    }

    /// Turns every slot face up, returning the cards that were not yet public.
    pub fn reveal_all(&mut self) -> Vec<Card> {
        (0..GRID_SIZE).filter_map(|pos| self.reveal(pos)).collect()
    }

    /// Places `card` face up at `position` and hands back the card it replaced.
    pub fn replace(&mut self, position: usize, card: Card) -> Option<Card> {
        let slot = self.slots.get_mut(position)?;
        let old = std::mem::replace(&mut slot.card, card);
        slot.visibility = Visibility::Public;
        Some(old)
    }

    /// Cards the owner can see; hidden slots are `None`.
    pub fn owner_view(&self) -> [Option<Card>; GRID_SIZE] {
        std::array::from_fn(|pos| {
            let slot = &self.slots[pos];
            slot.visibility.visible_to_owner().then_some(slot.card)
        })
    }

    /// Cards the rest of the table can see.
    pub fn public_view(&self) -> [Option<Card>; GRID_SIZE] {
        std::array::from_fn(|pos| {
            let slot = &self.slots[pos];
            slot.visibility.is_public().then_some(slot.card)
        })
    }

    pub fn private_ranks(&self) -> impl Iterator<Item = Rank> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.visibility == Visibility::PrivatelyVisible)
            .map(|slot| slot.card.rank)
    }

    /// Full score regardless of visibility.
    pub fn score(&self) -> i32 {
        score_cards(&self.cards())
    }
}
