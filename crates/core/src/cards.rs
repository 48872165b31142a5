use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Cups,
    Pentacles,
    Swords,
    Wands,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Cups, Suit::Pentacles, Suit::Swords, Suit::Wands];

    pub fn key(self) -> &'static str {
        match self {
            Suit::Cups => "cups",
            Suit::Pentacles => "pentacles",
            Suit::Swords => "swords",
            Suit::Wands => "wands",
        }
    }

    /// Position in the suit lock order used by SUIT_ORDER constraints.
    pub fn lock_index(self) -> usize {
        match self {
            Suit::Cups => 0,
            Suit::Pentacles => 1,
            Suit::Swords => 2,
            Suit::Wands => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Page,
    Knight,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 14] = [
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
        Rank::Page,
        Rank::Knight,
        Rank::Queen,
        Rank::King,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Rank::Ace => "ace",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Page => "page",
            Rank::Knight => "knight",
            Rank::Queen => "queen",
            Rank::King => "king",
        }
    }

    pub fn is_numbered(self) -> bool {
        self.numeric_value().is_some()
    }

    pub fn is_court(self) -> bool {
        self.court_base().is_some()
    }

    /// Value of the numbered ranks 2-10.
    pub fn numeric_value(self) -> Option<u32> {
        match self {
            Rank::Two => Some(2),
            Rank::Three => Some(3),
            Rank::Four => Some(4),
            Rank::Five => Some(5),
            Rank::Six => Some(6),
            Rank::Seven => Some(7),
            Rank::Eight => Some(8),
            Rank::Nine => Some(9),
            Rank::Ten => Some(10),
            _ => None,
        }
    }

    /// Base enemy value of the court ranks, before the reversed bonus.
    pub fn court_base(self) -> Option<u32> {
        match self {
            Rank::Page => Some(11),
            Rank::Knight => Some(12),
            Rank::Queen => Some(13),
            Rank::King => Some(14),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Upright,
    Reversed,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Upright => Orientation::Reversed,
            Orientation::Reversed => Orientation::Upright,
        }
    }
}

/// A minor card as held in the run's registry. Suit and rank are immutable;
/// the physical orientation is assigned at run creation and can flip later
/// (Leap of Faith).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub orientation: Orientation,
}

/// Deterministic string id, e.g. `cups_7` or `swords_queen`.
pub fn card_id(suit: Suit, rank: Rank) -> String {
    format!("{}_{}", suit.key(), rank.key())
}

/// The fixed 56-card registry order: suit-major, rank-minor. Orientation
/// assignment and deck rebuilds iterate this order before any shuffle.
pub fn registry_order() -> impl Iterator<Item = (Suit, Rank)> {
    Suit::ALL
        .into_iter()
        .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| (suit, rank)))
}

pub const MINOR_COUNT: usize = 56;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable() {
        assert_eq!(card_id(Suit::Cups, Rank::Seven), "cups_7");
        assert_eq!(card_id(Suit::Swords, Rank::Queen), "swords_queen");
        assert_eq!(card_id(Suit::Pentacles, Rank::Ace), "pentacles_ace");
        assert_eq!(card_id(Suit::Wands, Rank::Ten), "wands_10");
    }

    #[test]
    fn registry_has_56_unique_ids() {
        let ids: Vec<String> = registry_order().map(|(s, r)| card_id(s, r)).collect();
        assert_eq!(ids.len(), MINOR_COUNT);
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), MINOR_COUNT);
        assert_eq!(ids[0], "cups_ace");
        assert_eq!(ids[6], "cups_7");
        assert_eq!(ids[55], "wands_king");
    }

    #[test]
    fn court_values() {
        assert_eq!(Rank::Page.court_base(), Some(11));
        assert_eq!(Rank::King.court_base(), Some(14));
        assert!(Rank::Queen.is_court());
        assert!(!Rank::Ten.is_court());
        assert_eq!(Rank::Ten.numeric_value(), Some(10));
        assert!(!Rank::Ace.is_numbered());
    }
}
