use golf_core::belief::{EvParams, Recommendation, expected_value_draw_vs_discard};
use golf_core::game::state::GameState;
use golf_core::model::card::Card;
use golf_core::model::grid::{PlayerGrid, Visibility};
use golf_core::model::player::PlayerId;
use golf_core::model::rank::Rank;
use golf_core::model::suit::Suit;

use Visibility::{Hidden, PrivatelyVisible, Public};

fn c(rank: Rank, suit: Suit) -> Card {
    Card::new(rank, suit)
}

fn opponent() -> PlayerGrid {
    PlayerGrid::dealt([
        c(Rank::Two, Suit::Clubs),
        c(Rank::Three, Suit::Clubs),
        c(Rank::Four, Suit::Clubs),
        c(Rank::Five, Suit::Clubs),
    ])
}

fn table(cards: [Card; 4], visibility: [Visibility; 4], discard: Card) -> GameState {
    GameState::from_layout(
        vec![PlayerGrid::with_visibility(cards, visibility), opponent()],
        vec![discard],
        PlayerId::new(0),
        2,
    )
    .expect("valid layout")
}

#[test]
fn equal_branches_are_near_indifferent() {
    // K K are already public and paired; the private jacks pair each other.
    // Taking the jack changes nothing, and no draw can do better than flipping
    // a private card, which is also worth nothing.
    let state = table(
        [
            c(Rank::King, Suit::Spades),
            c(Rank::King, Suit::Hearts),
            c(Rank::Jack, Suit::Spades),
            c(Rank::Jack, Suit::Hearts),
        ],
        [Public, Public, PrivatelyVisible, PrivatelyVisible],
        c(Rank::Jack, Suit::Diamonds),
    );
    let view = state.view_for(PlayerId::new(0));
    let analysis = expected_value_draw_vs_discard(&view, PlayerId::new(0), &EvParams::default());

    assert_eq!(analysis.current, 0.0);
    let discard = analysis.discard.expect("discard branch");
    let draw = analysis.draw.expect("draw branch");
    assert_eq!(discard.ev, 0.0);
    assert!(draw.ev.abs() < 1e-12);
    assert_eq!(draw.ev, discard.ev);
    assert_eq!(analysis.recommendation, Recommendation::NearIndifferent);
    assert!(analysis.recommendation.prefers_draw());
}

#[test]
fn expensive_discard_recommends_drawing() {
    let state = table(
        [
            c(Rank::Six, Suit::Spades),
            c(Rank::Seven, Suit::Hearts),
            c(Rank::Ace, Suit::Spades),
            c(Rank::Two, Suit::Hearts),
        ],
        [Hidden, Hidden, PrivatelyVisible, PrivatelyVisible],
        c(Rank::King, Suit::Diamonds),
    );
    let view = state.view_for(PlayerId::new(0));
    let analysis = expected_value_draw_vs_discard(&view, PlayerId::new(0), &EvParams::default());

    let discard = analysis.discard.expect("discard branch");
    assert!(discard.ev > 0.0);
    assert!(analysis.advantage < -0.5);
    assert_eq!(analysis.recommendation, Recommendation::Draw);
}

#[test]
fn free_discard_over_court_cards_recommends_taking_it() {
    let state = table(
        [
            c(Rank::Six, Suit::Spades),
            c(Rank::Seven, Suit::Hearts),
            c(Rank::Queen, Suit::Spades),
            c(Rank::King, Suit::Hearts),
        ],
        [Hidden, Hidden, PrivatelyVisible, PrivatelyVisible],
        c(Rank::Jack, Suit::Diamonds),
    );
    let view = state.view_for(PlayerId::new(0));
    let analysis = expected_value_draw_vs_discard(&view, PlayerId::new(0), &EvParams::default());

    let discard = analysis.discard.expect("discard branch");
    assert!((discard.ev + 10.0).abs() < 1e-9);
    assert_eq!(discard.position, 2);
    assert!(analysis.advantage > 0.5);
    assert_eq!(analysis.recommendation, Recommendation::Discard);
}

#[test]
fn hidden_cards_are_never_peeked_at() {
    // Same visible information, different hidden cards: identical analysis.
    let visibility = [Hidden, Hidden, PrivatelyVisible, PrivatelyVisible];
    let a = table(
        [
            c(Rank::Jack, Suit::Spades),
            c(Rank::Jack, Suit::Hearts),
            c(Rank::Nine, Suit::Spades),
            c(Rank::Eight, Suit::Hearts),
        ],
        visibility,
        c(Rank::Six, Suit::Diamonds),
    );
    let b = table(
        [
            c(Rank::King, Suit::Spades),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Nine, Suit::Spades),
            c(Rank::Eight, Suit::Hearts),
        ],
        visibility,
        c(Rank::Six, Suit::Diamonds),
    );
    let params = EvParams::default();
    let seat = PlayerId::new(0);
    let ea = expected_value_draw_vs_discard(&a.view_for(seat), seat, &params);
    let eb = expected_value_draw_vs_discard(&b.view_for(seat), seat, &params);
    assert_eq!(ea, eb);
}

#[test]
fn fully_public_grid_has_nothing_to_analyse() {
    let state = table(
        [
            c(Rank::Six, Suit::Spades),
            c(Rank::Seven, Suit::Hearts),
            c(Rank::Queen, Suit::Spades),
            c(Rank::King, Suit::Hearts),
        ],
        [Public, Public, Public, Public],
        c(Rank::Jack, Suit::Diamonds),
    );
    let view = state.view_for(PlayerId::new(0));
    let analysis = expected_value_draw_vs_discard(&view, PlayerId::new(0), &EvParams::default());
    assert_eq!(analysis.recommendation, Recommendation::NoMove);
    assert!(analysis.discard.is_none());
    assert!(analysis.draw.is_none());
    assert!(view.legal_actions().is_empty());
}
