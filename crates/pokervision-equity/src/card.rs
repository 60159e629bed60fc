use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EquityError;

pub const RANKS: u8 = 13;
pub const SUITS: u8 = 4;
pub const DECK_SIZE: u8 = RANKS * SUITS;

/// Card identifier in `0..52`: `rank = id % 13`, `suit = id / 13`.
///
/// Ranks and suits are plain indices; no face values are attached here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

impl Card {
    pub fn new(id: u8) -> Result<Self, EquityError> {
        if id >= DECK_SIZE {
            return Err(EquityError::CardOutOfRange(id));
        }
        Ok(Self(id))
    }

    #[inline]
    pub fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 % RANKS
    }

    #[inline]
    pub fn suit(self) -> u8 {
        self.0 / RANKS
    }

    /// All 52 cards in id order.
    pub fn all() -> impl Iterator<Item = Card> {
        (0..DECK_SIZE).map(Card)
    }
}

impl TryFrom<u8> for Card {
    type Error = EquityError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Card::new(id)
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} (rank {}, suit {})", self.0, self.rank(), self.suit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_and_suit_decomposition() {
        let c = Card::new(27).unwrap();
        assert_eq!((c.rank(), c.suit()), (1, 2));
        let c = Card::new(51).unwrap();
        assert_eq!((c.rank(), c.suit()), (12, 3));
        assert_eq!(Card::new(13).unwrap().rank(), Card::new(0).unwrap().rank());
    }

    #[test]
    fn ids_outside_deck_are_rejected() {
        assert_eq!(Card::new(52), Err(EquityError::CardOutOfRange(52)));
        assert_eq!(Card::all().count(), 52);
    }

    #[test]
    fn serde_uses_plain_ids() {
        let json = serde_json::to_string(&Card::new(12).unwrap()).unwrap();
        assert_eq!(json, "12");
        assert!(serde_json::from_str::<Card>("77").is_err());
    }
}
