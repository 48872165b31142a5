use crate::cards::{Card, Orientation, Suit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeaponRestrictionMode {
    #[default]
    Default,
    Strict,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderConstraintKind {
    #[default]
    None,
    LeftToRight,
    RightToLeft,
    SuitOrder,
    #[serde(alias = "ASC_VALUE")]
    AscOrderingValue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderConstraint {
    pub kind: OrderConstraintKind,
    pub requires_choose_carried_first: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_major_id: Option<String>,
}

/// Floor-scoped rule switches, reset on every FloorStart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RulesState {
    pub weapon_restriction_mode: WeaponRestrictionMode,
    pub order_constraint: OrderConstraint,
}

/// Orientation used at the instant a slot is resolved or evaluated:
/// physical, then boss corruption of numbered ranks, then cleanse override.
pub fn effective_orientation(card: &Card, boss_mode: bool, cleansed: bool) -> Orientation {
    let mut orientation = card.orientation;
    if boss_mode && card.rank.is_numbered() {
        orientation = Orientation::Reversed;
    }
    if cleansed {
        orientation = Orientation::Upright;
    }
    orientation
}

/// Court fighting value: base 11-14 plus 2 when effectively reversed.
pub fn enemy_value(card: &Card, effective: Orientation) -> u32 {
    let base = card.rank.court_base().unwrap_or(0);
    match effective {
        Orientation::Reversed => base + 2,
        Orientation::Upright => base,
    }
}

/// Value used by ordering constraints and HIGHEST_VALUE selection:
/// ace 1, numbered ranks their value, courts their enemy value.
pub fn ordering_value(card: &Card, effective: Orientation) -> u32 {
    if let Some(value) = card.rank.numeric_value() {
        value
    } else if card.rank.is_court() {
        enemy_value(card, effective)
    } else {
        1
    }
}

/// The lock order SUIT_ORDER constraints resolve against.
pub const SUIT_LOCK_ORDER: [Suit; 4] = [Suit::Cups, Suit::Pentacles, Suit::Swords, Suit::Wands];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Rank;

    fn card(rank: Rank, orientation: Orientation) -> Card {
        Card {
            suit: Suit::Cups,
            rank,
            orientation,
        }
    }

    #[test]
    fn boss_mode_corrupts_numbered_only() {
        let seven = card(Rank::Seven, Orientation::Upright);
        assert_eq!(
            effective_orientation(&seven, true, false),
            Orientation::Reversed
        );
        let queen = card(Rank::Queen, Orientation::Upright);
        assert_eq!(
            effective_orientation(&queen, true, false),
            Orientation::Upright
        );
        let ace = card(Rank::Ace, Orientation::Upright);
        assert_eq!(
            effective_orientation(&ace, true, false),
            Orientation::Upright
        );
    }

    #[test]
    fn cleanse_overrides_corruption() {
        let seven = card(Rank::Seven, Orientation::Reversed);
        assert_eq!(
            effective_orientation(&seven, true, true),
            Orientation::Upright
        );
    }

    #[test]
    fn enemy_values() {
        let queen = card(Rank::Queen, Orientation::Upright);
        assert_eq!(enemy_value(&queen, Orientation::Upright), 13);
        assert_eq!(enemy_value(&queen, Orientation::Reversed), 15);
    }

    #[test]
    fn ordering_values() {
        assert_eq!(
            ordering_value(&card(Rank::Ace, Orientation::Upright), Orientation::Upright),
            1
        );
        assert_eq!(
            ordering_value(&card(Rank::Six, Orientation::Upright), Orientation::Upright),
            6
        );
        assert_eq!(
            ordering_value(&card(Rank::King, Orientation::Upright), Orientation::Reversed),
            16
        );
    }
}
