use serde::{Deserialize, Serialize};

use crate::card::RANKS;
use crate::Card;

/// Two-level hand strength: any repeated rank beats no repeated rank.
///
/// Straights, flushes and kickers are not distinguished, so two hands that
/// both contain a pair always tie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    HighCard = 1,
    PairOrBetter = 2,
}

impl Tier {
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Rank a 7-card hand.
pub fn rank(cards: &[Card; 7]) -> Tier {
    let mut counts = [0u8; RANKS as usize];
    for card in cards {
        let slot = &mut counts[card.rank() as usize];
        *slot += 1;
        if *slot >= 2 {
            return Tier::PairOrBetter;
        }
    }
    Tier::HighCard
}
