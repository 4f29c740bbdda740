use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

pub const RANK_COUNT: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Ace = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
}

impl Rank {
    pub const ORDERED: [Rank; RANK_COUNT] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rank::Ace),
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            _ => None,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < RANK_COUNT {
            Self::from_value(index as u8 + 1)
        } else {
            None
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Zero-based position in [`Rank::ORDERED`].
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Golf points: aces are low, jacks are free, court cards cost ten.
    pub const fn score(self) -> i32 {
        match self {
            Rank::Ace => 1,
            Rank::Jack => 0,
            Rank::Queen | Rank::King => 10,
            other => other as i32,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Rank::ORDERED
            .iter()
            .copied()
            .find(|rank| rank.symbol().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown rank: {trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn from_value_maps() {
        assert_eq!(Rank::from_value(11), Some(Rank::Jack));
        assert_eq!(Rank::from_value(0), None);
        assert_eq!(Rank::from_value(14), None);
    }

    #[test]
    fn scores_follow_golf_rules() {
        assert_eq!(Rank::Ace.score(), 1);
        assert_eq!(Rank::Seven.score(), 7);
        assert_eq!(Rank::Ten.score(), 10);
        assert_eq!(Rank::Jack.score(), 0);
        assert_eq!(Rank::Queen.score(), 10);
        assert_eq!(Rank::King.score(), 10);
    }

    #[test]
    fn index_roundtrip() {
        for (i, rank) in Rank::ORDERED.iter().enumerate() {
            assert_eq!(rank.index(), i);
            assert_eq!(Rank::from_index(i), Some(*rank));
        }
        assert_eq!(Rank::from_index(13), None);
    }

    #[test]
    fn display_and_parse_match_symbols() {
        assert_eq!(Rank::Queen.to_string(), "Q");
        assert_eq!(Rank::Ten.to_string(), "10");
        assert_eq!("k".parse::<Rank>(), Ok(Rank::King));
        assert!("1".parse::<Rank>().is_err());
    }
}
