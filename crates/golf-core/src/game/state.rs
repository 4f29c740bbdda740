use crate::belief::counts::RankCounts;
use crate::game::action::{Action, enumerate_actions};
use crate::game::error::{GameSetupError, IllegalActionError};
use crate::model::card::Card;
use crate::model::deck::{DECK_SIZE, Deck};
use crate::model::grid::{GRID_SIZE, PlayerGrid};
use crate::model::player::PlayerId;
use crate::model::score::ScoreBoard;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;
pub const MAX_ROUNDS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    Applied,
    /// The player had nothing to do, or declined to act.
    Passed,
    Forfeited(IllegalActionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub player: PlayerId,
    pub round: u8,
    pub action: Option<Action>,
    pub outcome: TurnOutcome,
}

/// What a successful action did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedAction {
    pub player: PlayerId,
    pub action: Action,
    /// Card now on top of the discard pile.
    pub discarded: Card,
    /// Card that entered the grid, for swaps.
    pub placed: Option<Card>,
    /// Card that was turned face up, for flips.
    pub flipped: Option<Card>,
    pub game_over: bool,
}

/// Full, unfiltered state of one game. Agents never see this directly; they
/// get a [`GameView`](crate::game::view::GameView).
#[derive(Debug, Clone)]
pub struct GameState {
    seed: u64,
    grids: Vec<PlayerGrid>,
    deck: Deck,
    discard: Vec<Card>,
    turn: PlayerId,
    round: u8,
    history: Vec<TurnRecord>,
    unseen: RankCounts,
    scores: Option<ScoreBoard>,
}

impl GameState {
    pub fn new(num_players: usize) -> Result<Self, GameSetupError> {
        Self::with_seed(num_players, rand::random())
    }

    pub fn with_seed(num_players: usize, seed: u64) -> Result<Self, GameSetupError> {
        check_player_count(num_players)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = Deck::shuffled(&mut rng);

        let mut grids = Vec::with_capacity(num_players);
        for _ in 0..num_players {
            let grid = deal_grid(&mut deck).ok_or(GameSetupError::CardCount {
                expected: DECK_SIZE,
                found: deck.len(),
            })?;
            grids.push(grid);
        }
        let upcard = deck.draw().ok_or(GameSetupError::CardCount {
            expected: DECK_SIZE,
            found: 0,
        })?;

        let mut unseen = RankCounts::full();
        unseen.mark_seen(upcard.rank);

        Ok(Self {
            seed,
            grids,
            deck,
            discard: vec![upcard],
            turn: PlayerId::new(0),
            round: 1,
            history: Vec::new(),
            unseen,
            scores: None,
        })
    }

    /// Builds a mid-game position from explicit parts. The 52 cards must be
    /// split exactly across deck, discard pile and grids.
    pub fn from_parts(
        grids: Vec<PlayerGrid>,
        deck: Deck,
        discard: Vec<Card>,
        turn: PlayerId,
        round: u8,
    ) -> Result<Self, GameSetupError> {
        check_player_count(grids.len())?;
        if !(1..=MAX_ROUNDS).contains(&round) {
            return Err(GameSetupError::Round(round));
        }
        if turn.index() >= grids.len() {
            return Err(GameSetupError::Turn {
                turn,
                players: grids.len(),
            });
        }

        let mut seen = HashSet::with_capacity(DECK_SIZE);
        let all_cards = deck
            .cards()
            .iter()
            .chain(discard.iter())
            .chain(grids.iter().flat_map(|grid| grid.slots().iter().map(|slot| &slot.card)));
        for card in all_cards {
            if !seen.insert(*card) {
                return Err(GameSetupError::DuplicateCard(*card));
            }
        }
        if seen.len() != DECK_SIZE {
            return Err(GameSetupError::CardCount {
                expected: DECK_SIZE,
                found: seen.len(),
            });
        }

        let unseen = recount_unseen(&grids, &discard);
        Ok(Self {
            seed: 0,
            grids,
            deck,
            discard,
            turn,
            round,
            history: Vec::new(),
            unseen,
            scores: None,
        })
    }

    /// Like [`GameState::from_parts`], but the deck is every remaining card in
    /// standard order (the last one listed is drawn first).
    pub fn from_layout(
        grids: Vec<PlayerGrid>,
        discard: Vec<Card>,
        turn: PlayerId,
        round: u8,
    ) -> Result<Self, GameSetupError> {
        let placed: HashSet<Card> = grids
            .iter()
            .flat_map(|grid| grid.cards())
            .chain(discard.iter().copied())
            .collect();
        let remaining = Deck::standard()
            .cards()
            .iter()
            .copied()
            .filter(|card| !placed.contains(card))
            .collect();
        Self::from_parts(grids, Deck::from_cards(remaining), discard, turn, round)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn num_players(&self) -> usize {
        self.grids.len()
    }

    pub fn grid(&self, player: PlayerId) -> Option<&PlayerGrid> {
        self.grids.get(player.index())
    }

    pub fn grids(&self) -> &[PlayerGrid] {
        &self.grids
    }

    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    pub fn discard_top(&self) -> Option<Card> {
        self.discard.last().copied()
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard
    }

    pub fn current_player(&self) -> PlayerId {
        self.turn
    }

    pub fn round(&self) -> u8 {
        self.round
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    /// Per-rank count of cards nobody at the table has seen face up.
    pub fn public_unseen(&self) -> &RankCounts {
        &self.unseen
    }

    /// Public unseen counts with `player`'s privately visible cards removed.
    pub fn unseen_for(&self, player: PlayerId) -> RankCounts {
        let mut counts = self.unseen;
        if let Some(grid) = self.grid(player) {
            for rank in grid.private_ranks() {
                counts.mark_seen(rank);
            }
        }
        counts
    }

    pub fn is_finished(&self) -> bool {
        self.scores.is_some()
    }

    pub fn final_scores(&self) -> Option<&ScoreBoard> {
        self.scores.as_ref()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.scores.as_ref().and_then(ScoreBoard::winner)
    }

    /// Every action `player` may take right now, empty if it is not their turn.
    pub fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        if self.is_finished() || player != self.turn {
            return Vec::new();
        }
        let Some(grid) = self.grid(player) else {
            return Vec::new();
        };
        enumerate_actions(
            &grid.available_positions(),
            !self.discard.is_empty(),
            !self.deck.is_empty(),
        )
    }

    /// Plays `action` for `player`.
    ///
    /// An action that targets a face-up slot or an empty pile still uses up the
    /// player's turn; the error is returned so the caller can re-prompt.
    pub fn apply(
        &mut self,
        player: PlayerId,
        action: Action,
    ) -> Result<AppliedAction, IllegalActionError> {
        self.check_turn(player)?;
        let round = self.round;
        match self.execute(player, action) {
            Ok((discarded, placed, flipped)) => {
                self.history.push(TurnRecord {
                    player,
                    round,
                    action: Some(action),
                    outcome: TurnOutcome::Applied,
                });
                self.advance();
                Ok(AppliedAction {
                    player,
                    action,
                    discarded,
                    placed,
                    flipped,
                    game_over: self.is_finished(),
                })
            }
            Err(err) => {
                self.history.push(TurnRecord {
                    player,
                    round,
                    action: Some(action),
                    outcome: TurnOutcome::Forfeited(err),
                });
                self.advance();
                Err(err)
            }
        }
    }

    /// Ends `player`'s turn without touching any cards.
    pub fn pass_turn(&mut self, player: PlayerId) -> Result<(), IllegalActionError> {
        self.check_turn(player)?;
        self.history.push(TurnRecord {
            player,
            round: self.round,
            action: None,
            outcome: TurnOutcome::Passed,
        });
        self.advance();
        Ok(())
    }

    /// Recomputes unseen counts from the visible table, ignoring the
    /// incremental bookkeeping.
    pub fn recount_unseen(&self) -> RankCounts {
        recount_unseen(&self.grids, &self.discard)
    }

    pub fn total_cards(&self) -> usize {
        self.deck.len() + self.discard.len() + self.grids.len() * GRID_SIZE
    }

    fn check_turn(&self, player: PlayerId) -> Result<(), IllegalActionError> {
        if self.is_finished() {
            return Err(IllegalActionError::GameOver);
        }
        if player != self.turn {
            return Err(IllegalActionError::NotYourTurn {
                expected: self.turn,
                actual: player,
            });
        }
        Ok(())
    }

    /// Validates and performs the card movement. Nothing is mutated on error.
    fn execute(
        &mut self,
        player: PlayerId,
        action: Action,
    ) -> Result<(Card, Option<Card>, Option<Card>), IllegalActionError> {
        let position = action.position();
        let seat = player.index();
        let visibility = self.grids[seat]
            .visibility(position)
            .ok_or(IllegalActionError::InvalidPosition(position))?;
        if visibility.is_public() {
            return Err(IllegalActionError::SlotAlreadyPublic(position));
        }

        match action {
            Action::TakeDiscard { .. } => {
                let incoming = self.discard.pop().ok_or(IllegalActionError::EmptyDiscard)?;
                let outgoing = self.swap_into_grid(seat, position, incoming)?;
                Ok((outgoing, Some(incoming), None))
            }
            Action::DrawKeep { .. } => {
                let drawn = self.deck.draw().ok_or(IllegalActionError::EmptyDeck)?;
                self.unseen.mark_seen(drawn.rank);
                let outgoing = self.swap_into_grid(seat, position, drawn)?;
                Ok((outgoing, Some(drawn), None))
            }
            Action::DrawDiscardAndFlip { .. } => {
                let drawn = self.deck.draw().ok_or(IllegalActionError::EmptyDeck)?;
                self.unseen.mark_seen(drawn.rank);
                self.discard.push(drawn);
                let flipped = self.grids[seat]
                    .reveal(position)
                    .ok_or(IllegalActionError::SlotAlreadyPublic(position))?;
                self.unseen.mark_seen(flipped.rank);
                Ok((drawn, None, Some(flipped)))
            }
        }
    }

    fn swap_into_grid(
        &mut self,
        seat: usize,
        position: usize,
        incoming: Card,
    ) -> Result<Card, IllegalActionError> {
        let outgoing = self.grids[seat]
            .replace(position, incoming)
            .ok_or(IllegalActionError::InvalidPosition(position))?;
        self.unseen.mark_seen(outgoing.rank);
        self.discard.push(outgoing);
        Ok(outgoing)
    }

    fn advance(&mut self) {
        self.assert_conservation();
        self.turn = self.turn.next(self.num_players());
        if self.turn.index() == 0 {
            self.round += 1;
        }
        if self.round > MAX_ROUNDS {
            self.finish();
        }
    }

    fn finish(&mut self) {
        for grid in &mut self.grids {
            for card in grid.reveal_all() {
                self.unseen.mark_seen(card.rank);
            }
        }
        let totals = self.grids.iter().map(PlayerGrid::score).collect();
        self.scores = Some(ScoreBoard::new(totals));
        debug_assert_eq!(self.unseen.total() as usize, self.deck.len());
    }

    fn assert_conservation(&self) {
        let total = self.total_cards();
        assert_eq!(
            total,
            DECK_SIZE,
            "card conservation violated: deck {} + discard {} + grids {}",
            self.deck.len(),
            self.discard.len(),
            self.grids.len() * GRID_SIZE
        );
    }
}

fn check_player_count(num_players: usize) -> Result<(), GameSetupError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
        Ok(())
    } else {
        Err(GameSetupError::PlayerCount {
            requested: num_players,
            min: MIN_PLAYERS,
            max: MAX_PLAYERS,
        })
    }
}

fn deal_grid(deck: &mut Deck) -> Option<PlayerGrid> {
    let cards = [deck.draw()?, deck.draw()?, deck.draw()?, deck.draw()?];
    Some(PlayerGrid::dealt(cards))
}

fn recount_unseen(grids: &[PlayerGrid], discard: &[Card]) -> RankCounts {
    let public = grids
        .iter()
        .flat_map(|grid| grid.public_view())
        .flatten()
        .chain(discard.iter().copied())
        .map(|card| card.rank);
    RankCounts::from_seen(public)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::ActionKind;
    use crate::model::grid::Visibility;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn arranged() -> GameState {
        let p0 = PlayerGrid::dealt([
            card(Rank::Two, Suit::Spades),
            card(Rank::Nine, Suit::Spades),
            card(Rank::King, Suit::Spades),
            card(Rank::Four, Suit::Spades),
        ]);
        let p1 = PlayerGrid::dealt([
            card(Rank::Two, Suit::Hearts),
            card(Rank::Nine, Suit::Hearts),
            card(Rank::King, Suit::Hearts),
            card(Rank::Four, Suit::Hearts),
        ]);
        GameState::from_layout(
            vec![p0, p1],
            vec![card(Rank::Ace, Suit::Clubs)],
            PlayerId::new(0),
            1,
        )
        .expect("valid layout")
    }

    #[test]
    fn deal_gives_four_cards_each_and_one_upcard() {
        let state = GameState::with_seed(3, 7).expect("deal");
        assert_eq!(state.num_players(), 3);
        assert_eq!(state.deck_size(), DECK_SIZE - 12 - 1);
        assert_eq!(state.discard_pile().len(), 1);
        assert_eq!(state.round(), 1);
        assert_eq!(state.current_player(), PlayerId::new(0));
        for grid in state.grids() {
            assert_eq!(grid.visibility(0), Some(Visibility::Hidden));
            assert_eq!(grid.visibility(2), Some(Visibility::PrivatelyVisible));
        }
        assert_eq!(state.public_unseen().total(), 51);
    }

    #[test]
    fn same_seed_same_deal() {
        let a = GameState::with_seed(2, 99).expect("deal");
        let b = GameState::with_seed(2, 99).expect("deal");
        assert_eq!(a.grids(), b.grids());
        assert_eq!(a.discard_top(), b.discard_top());
    }

    #[test]
    fn player_count_is_bounded() {
        assert!(matches!(
            GameState::with_seed(1, 0),
            Err(GameSetupError::PlayerCount { requested: 1, .. })
        ));
        assert!(GameState::with_seed(7, 0).is_err());
        assert!(GameState::with_seed(6, 0).is_ok());
    }

    #[test]
    fn take_discard_swaps_with_pile() {
        let mut state = arranged();
        let applied = state
            .apply(PlayerId::new(0), Action::TakeDiscard { position: 2 })
            .expect("legal");
        assert_eq!(applied.placed, Some(card(Rank::Ace, Suit::Clubs)));
        assert_eq!(applied.discarded, card(Rank::King, Suit::Spades));
        assert_eq!(state.discard_top(), Some(card(Rank::King, Suit::Spades)));
        let grid = state.grid(PlayerId::new(0)).expect("seat");
        assert_eq!(grid.visibility(2), Some(Visibility::Public));
        assert_eq!(state.current_player(), PlayerId::new(1));
    }

    #[test]
    fn draw_keep_takes_top_of_deck() {
        let mut state = arranged();
        let top = state.deck.peek().expect("deck");
        let applied = state
            .apply(PlayerId::new(0), Action::DrawKeep { position: 0 })
            .expect("legal");
        assert_eq!(applied.placed, Some(top));
        assert_eq!(state.grid(PlayerId::new(0)).and_then(|g| g.card(0)), Some(top));
        assert_eq!(state.discard_top(), Some(card(Rank::Two, Suit::Spades)));
    }

    #[test]
    fn flip_reveals_without_swapping() {
        let mut state = arranged();
        let top = state.deck.peek().expect("deck");
        let applied = state
            .apply(
                PlayerId::new(0),
                Action::DrawDiscardAndFlip { flip_position: 1 },
            )
            .expect("legal");
        assert_eq!(applied.flipped, Some(card(Rank::Nine, Suit::Spades)));
        assert_eq!(state.discard_top(), Some(top));
        let grid = state.grid(PlayerId::new(0)).expect("seat");
        assert_eq!(grid.card(1), Some(card(Rank::Nine, Suit::Spades)));
        assert_eq!(grid.visibility(1), Some(Visibility::Public));
    }

    #[test]
    fn out_of_turn_does_not_consume_turn() {
        let mut state = arranged();
        let err = state
            .apply(PlayerId::new(1), Action::DrawKeep { position: 0 })
            .expect_err("wrong seat");
        assert!(matches!(err, IllegalActionError::NotYourTurn { .. }));
        assert_eq!(state.current_player(), PlayerId::new(0));
        assert!(state.history().is_empty());
    }

    #[test]
    fn public_target_forfeits_the_turn() {
        let mut state = arranged();
        state
            .apply(PlayerId::new(0), Action::TakeDiscard { position: 3 })
            .expect("legal");
        state.pass_turn(PlayerId::new(1)).expect("pass");
        let before = state.deck_size();
        let err = state
            .apply(PlayerId::new(0), Action::DrawKeep { position: 3 })
            .expect_err("slot already public");
        assert_eq!(err, IllegalActionError::SlotAlreadyPublic(3));
        assert_eq!(state.deck_size(), before);
        assert_eq!(state.current_player(), PlayerId::new(1));
        assert_eq!(state.round(), 2);
        assert_eq!(
            state.history().last().map(|r| r.outcome),
            Some(TurnOutcome::Forfeited(IllegalActionError::SlotAlreadyPublic(3)))
        );
    }

    fn arranged_grids() -> Vec<PlayerGrid> {
        let mut grids = Vec::new();
        for suit in [Suit::Spades, Suit::Hearts] {
            grids.push(PlayerGrid::dealt([
                card(Rank::Two, suit),
                card(Rank::Nine, suit),
                card(Rank::King, suit),
                card(Rank::Four, suit),
            ]));
        }
        grids
    }

    #[test]
    fn empty_discard_forfeits_take_discard() {
        let mut state =
            GameState::from_layout(arranged_grids(), Vec::new(), PlayerId::new(0), 1)
                .expect("valid layout");
        let legal = state.legal_actions(PlayerId::new(0));
        assert_eq!(legal.len(), 8);
        assert!(
            legal
                .iter()
                .all(|action| action.kind() != ActionKind::TakeDiscard)
        );

        let unseen = *state.public_unseen();
        let err = state
            .apply(PlayerId::new(0), Action::TakeDiscard { position: 0 })
            .expect_err("nothing to take");
        assert_eq!(err, IllegalActionError::EmptyDiscard);
        assert_eq!(state.current_player(), PlayerId::new(1));
        assert_eq!(state.total_cards(), DECK_SIZE);
        assert_eq!(*state.public_unseen(), unseen);
        assert!(state.discard_pile().is_empty());
        assert_eq!(
            state.grid(PlayerId::new(0)).and_then(|grid| grid.visibility(0)),
            Some(Visibility::Hidden)
        );
        assert_eq!(
            state.history().last().map(|r| r.outcome),
            Some(TurnOutcome::Forfeited(IllegalActionError::EmptyDiscard))
        );
    }

    #[test]
    fn empty_deck_forfeits_draws() {
        let grids = arranged_grids();
        let placed: HashSet<Card> = grids.iter().flat_map(|grid| grid.cards()).collect();
        let discard: Vec<Card> = Deck::standard()
            .cards()
            .iter()
            .copied()
            .filter(|card| !placed.contains(card))
            .collect();
        let mut state = GameState::from_parts(
            grids,
            Deck::from_cards(Vec::new()),
            discard,
            PlayerId::new(0),
            1,
        )
        .expect("valid parts");
        let legal = state.legal_actions(PlayerId::new(0));
        assert_eq!(legal.len(), 4);
        assert!(
            legal
                .iter()
                .all(|action| action.kind() == ActionKind::TakeDiscard)
        );

        let unseen = *state.public_unseen();
        let err = state
            .apply(PlayerId::new(0), Action::DrawKeep { position: 1 })
            .expect_err("deck is empty");
        assert_eq!(err, IllegalActionError::EmptyDeck);
        let err = state
            .apply(
                PlayerId::new(1),
                Action::DrawDiscardAndFlip { flip_position: 0 },
            )
            .expect_err("deck is empty");
        assert_eq!(err, IllegalActionError::EmptyDeck);
        assert_eq!(state.round(), 2);
        assert_eq!(state.current_player(), PlayerId::new(0));
        assert_eq!(state.total_cards(), DECK_SIZE);
        assert_eq!(*state.public_unseen(), unseen);
        assert_eq!(
            state.grid(PlayerId::new(1)).and_then(|grid| grid.visibility(0)),
            Some(Visibility::Hidden)
        );
    }

    #[test]
    fn legal_actions_empty_off_turn() {
        let state = arranged();
        assert_eq!(state.legal_actions(PlayerId::new(0)).len(), 12);
        assert!(state.legal_actions(PlayerId::new(1)).is_empty());
    }

    #[test]
    fn game_ends_after_four_rounds() {
        let mut state = GameState::with_seed(2, 5).expect("deal");
        for _ in 0..8 {
            let player = state.current_player();
            let action = state.legal_actions(player)[0];
            let _ = state.apply(player, action);
        }
        assert!(state.is_finished());
        assert_eq!(state.round(), 5);
        assert!(state.grids().iter().all(PlayerGrid::is_fully_public));
        assert_eq!(
            state.apply(PlayerId::new(0), Action::DrawKeep { position: 0 }),
            Err(IllegalActionError::GameOver)
        );
        let scores = state.final_scores().expect("scored");
        assert_eq!(scores.standings().len(), 2);
        assert!(state.legal_actions(PlayerId::new(0)).is_empty());
    }

    #[test]
    fn incremental_unseen_matches_recount() {
        let mut state = GameState::with_seed(4, 11).expect("deal");
        while !state.is_finished() {
            let player = state.current_player();
            let actions = state.legal_actions(player);
            let pick = actions[(state.history().len() * 5) % actions.len()];
            let _ = state.apply(player, pick);
            assert_eq!(*state.public_unseen(), state.recount_unseen());
        }
    }

    #[test]
    fn from_parts_rejects_duplicates() {
        let dup = card(Rank::Ace, Suit::Clubs);
        let p0 = PlayerGrid::dealt([dup, dup, dup, dup]);
        let p1 = PlayerGrid::dealt([
            card(Rank::Two, Suit::Hearts),
            card(Rank::Nine, Suit::Hearts),
            card(Rank::King, Suit::Hearts),
            card(Rank::Four, Suit::Hearts),
        ]);
        let result = GameState::from_parts(
            vec![p0, p1],
            Deck::from_cards(Vec::new()),
            Vec::new(),
            PlayerId::new(0),
            1,
        );
        assert_eq!(result.err(), Some(GameSetupError::DuplicateCard(dup)));
    }
}
