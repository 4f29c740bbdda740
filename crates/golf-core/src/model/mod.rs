pub mod card;
pub mod deck;
pub mod grid;
pub mod player;
pub mod rank;
pub mod score;
pub mod suit;
