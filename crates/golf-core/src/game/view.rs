use crate::belief::counts::RankCounts;
use crate::game::action::{Action, enumerate_actions};
use crate::game::state::GameState;
use crate::model::card::Card;
use crate::model::grid::{GRID_SIZE, PlayerGrid, Visibility};
use crate::model::player::PlayerId;
use crate::model::rank::Rank;
use crate::model::score::score_ranks;
use serde::{Deserialize, Serialize};

/// Who is looking at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Viewer {
    Spectator,
    Player(PlayerId),
}

/// One slot as a particular viewer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "card", rename_all = "snake_case")]
pub enum SlotView {
    Unknown,
    /// Known to the viewer only (their own privately visible card).
    Private(Card),
    Public(Card),
}

impl SlotView {
    fn project(visibility: Visibility, card: Card, is_owner: bool) -> Self {
        match visibility {
            Visibility::Public => SlotView::Public(card),
            Visibility::PrivatelyVisible if is_owner => SlotView::Private(card),
            _ => SlotView::Unknown,
        }
    }

    pub fn card(self) -> Option<Card> {
        match self {
            SlotView::Unknown => None,
            SlotView::Private(card) | SlotView::Public(card) => Some(card),
        }
    }

    pub fn rank(self) -> Option<Rank> {
        self.card().map(|card| card.rank)
    }

    pub fn is_public(self) -> bool {
        matches!(self, SlotView::Public(_))
    }

    pub fn is_known(self) -> bool {
        !matches!(self, SlotView::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridView {
    pub owner: PlayerId,
    pub slots: [SlotView; GRID_SIZE],
}

impl GridView {
    pub fn of(grid: &PlayerGrid, owner: PlayerId, viewer: Viewer) -> Self {
        let is_owner = viewer == Viewer::Player(owner);
        let slots = std::array::from_fn(|pos| {
            let slot = &grid.slots()[pos];
            SlotView::project(slot.visibility, slot.card, is_owner)
        });
        Self { owner, slots }
    }

    pub fn known_ranks(&self) -> [Option<Rank>; GRID_SIZE] {
        self.slots.map(SlotView::rank)
    }

    pub fn known_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_known()).count()
    }

    /// Positions that are not face up yet.
    pub fn available_positions(&self) -> Vec<usize> {
        (0..GRID_SIZE)
            .filter(|&pos| !self.slots[pos].is_public())
            .collect()
    }

    /// Score of the known cards only; unknown slots count as zero and never pair.
    pub fn visible_score(&self) -> i32 {
        score_ranks(&self.known_ranks())
    }
}

/// Visibility-filtered snapshot of a game for one viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub viewer: Viewer,
    pub round: u8,
    pub turn: PlayerId,
    pub finished: bool,
    pub discard_top: Option<Card>,
    pub deck_size: usize,
    pub discard_size: usize,
    pub grids: Vec<GridView>,
    /// Ranks nobody has seen face up.
    pub public_unseen: RankCounts,
    /// Ranks unknown to this viewer (public unseen minus their private cards).
    pub unseen: RankCounts,
    pub final_scores: Option<Vec<i32>>,
}

impl GameView {
    pub fn seat(&self) -> Option<PlayerId> {
        match self.viewer {
            Viewer::Player(id) => Some(id),
            Viewer::Spectator => None,
        }
    }

    pub fn num_players(&self) -> usize {
        self.grids.len()
    }

    pub fn grid(&self, player: PlayerId) -> Option<&GridView> {
        self.grids.get(player.index())
    }

    pub fn own_grid(&self) -> Option<&GridView> {
        self.seat().and_then(|seat| self.grid(seat))
    }

    pub fn is_my_turn(&self) -> bool {
        !self.finished && self.seat() == Some(self.turn)
    }

    /// Open positions on the viewer's own grid.
    pub fn available_positions(&self) -> Vec<usize> {
        self.own_grid()
            .map(GridView::available_positions)
            .unwrap_or_default()
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        if !self.is_my_turn() {
            return Vec::new();
        }
        enumerate_actions(
            &self.available_positions(),
            self.discard_top.is_some(),
            self.deck_size > 0,
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl GameState {
    pub fn view(&self, viewer: Viewer) -> GameView {
        let grids = self
            .grids()
            .iter()
            .enumerate()
            .map(|(index, grid)| GridView::of(grid, PlayerId::new(index), viewer))
            .collect();
        let unseen = match viewer {
            Viewer::Player(id) => self.unseen_for(id),
            Viewer::Spectator => *self.public_unseen(),
        };
        GameView {
            viewer,
            round: self.round(),
            turn: self.current_player(),
            finished: self.is_finished(),
            discard_top: self.discard_top(),
            deck_size: self.deck_size(),
            discard_size: self.discard_pile().len(),
            grids,
            public_unseen: *self.public_unseen(),
            unseen,
            final_scores: self.final_scores().map(|board| board.standings().to_vec()),
        }
    }

    pub fn view_for(&self, player: PlayerId) -> GameView {
        self.view(Viewer::Player(player))
    }
}
