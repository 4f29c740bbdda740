use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// One turn's move. Every variant targets a grid position that is not yet public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Swap the discard top into `position`; the old card goes to the discard pile.
    TakeDiscard { position: usize },
    /// Draw from the deck and swap the drawn card into `position`.
    DrawKeep { position: usize },
    /// Draw from the deck, discard it unseen by the grid, and turn `flip_position` face up.
    DrawDiscardAndFlip { flip_position: usize },
}

impl Action {
    pub const fn kind(self) -> ActionKind {
        match self {
            Action::TakeDiscard { .. } => ActionKind::TakeDiscard,
            Action::DrawKeep { .. } => ActionKind::DrawKeep,
            Action::DrawDiscardAndFlip { .. } => ActionKind::DrawDiscardAndFlip,
        }
    }

    pub const fn position(self) -> usize {
        match self {
            Action::TakeDiscard { position } | Action::DrawKeep { position } => position,
            Action::DrawDiscardAndFlip { flip_position } => flip_position,
        }
    }

    pub const fn from_parts(kind: ActionKind, position: usize) -> Self {
        match kind {
            ActionKind::TakeDiscard => Action::TakeDiscard { position },
            ActionKind::DrawKeep => Action::DrawKeep { position },
            ActionKind::DrawDiscardAndFlip => Action::DrawDiscardAndFlip {
                flip_position: position,
            },
        }
    }

    pub const fn draws_from_deck(self) -> bool {
        !matches!(self, Action::TakeDiscard { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind(), self.position())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    TakeDiscard,
    DrawKeep,
    DrawDiscardAndFlip,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [
        ActionKind::TakeDiscard,
        ActionKind::DrawKeep,
        ActionKind::DrawDiscardAndFlip,
    ];

    pub const fn index(self) -> usize {
        match self {
            ActionKind::TakeDiscard => 0,
            ActionKind::DrawKeep => 1,
            ActionKind::DrawDiscardAndFlip => 2,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ActionKind::TakeDiscard),
            1 => Some(ActionKind::DrawKeep),
            2 => Some(ActionKind::DrawDiscardAndFlip),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::TakeDiscard => "take_discard",
            ActionKind::DrawKeep => "draw_keep",
            ActionKind::DrawDiscardAndFlip => "draw_discard_flip",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("unknown action kind: {s}"))
    }
}

/// Every legal action for a grid with the given open positions, in a fixed order:
/// take-discard moves first, then draw-keep, then draw-and-flip.
pub fn enumerate_actions(
    available_positions: &[usize],
    discard_nonempty: bool,
    deck_nonempty: bool,
) -> Vec<Action> {
    let mut actions = Vec::with_capacity(available_positions.len() * 3);
    if discard_nonempty {
        actions.extend(
            available_positions
                .iter()
                .map(|&position| Action::TakeDiscard { position }),
        );
    }
    if deck_nonempty {
        actions.extend(
            available_positions
                .iter()
                .map(|&position| Action::DrawKeep { position }),
        );
        actions.extend(
            available_positions
                .iter()
                .map(|&flip_position| Action::DrawDiscardAndFlip { flip_position }),
        );
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::{Action, ActionKind, enumerate_actions};

    #[test]
    fn enumerate_orders_by_family() {
        let actions = enumerate_actions(&[1, 3], true, true);
        assert_eq!(
            actions,
            vec![
                Action::TakeDiscard { position: 1 },
                Action::TakeDiscard { position: 3 },
                Action::DrawKeep { position: 1 },
                Action::DrawKeep { position: 3 },
                Action::DrawDiscardAndFlip { flip_position: 1 },
                Action::DrawDiscardAndFlip { flip_position: 3 },
            ]
        );
    }

    #[test]
    fn empty_sources_remove_families() {
        assert_eq!(enumerate_actions(&[0], false, true).len(), 2);
        assert_eq!(enumerate_actions(&[0], true, false).len(), 1);
        assert!(enumerate_actions(&[0], false, false).is_empty());
        assert!(enumerate_actions(&[], true, true).is_empty());
    }

    #[test]
    fn from_parts_roundtrips_kind_and_position() {
        for kind in ActionKind::ALL {
            let action = Action::from_parts(kind, 2);
            assert_eq!(action.kind(), kind);
            assert_eq!(action.position(), 2);
            assert_eq!(ActionKind::from_index(kind.index()), Some(kind));
        }
    }

    #[test]
    fn action_serializes_with_type_tag() {
        let json = serde_json::to_string(&Action::DrawDiscardAndFlip { flip_position: 0 })
            .expect("serialize");
        assert_eq!(json, r#"{"type":"draw_discard_and_flip","flip_position":0}"#);
        let parsed: Action = serde_json::from_str(r#"{"type":"take_discard","position":3}"#)
            .expect("deserialize");
        assert_eq!(parsed, Action::TakeDiscard { position: 3 });
    }
}
