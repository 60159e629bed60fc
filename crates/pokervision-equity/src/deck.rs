use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Card, EquityError};

/// Ordered collection of distinct cards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

/// Cards dealt by [`Deck::shuffle_and_draw`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draw {
    pub opponent: Vec<Card>,
    pub board: Vec<Card>,
}

/// The 52 cards in id order.
pub fn full_deck() -> Deck {
    Deck::full()
}

impl Deck {
    pub fn full() -> Self {
        Self {
            cards: Card::all().collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Remove every card in `cards`.
    ///
    /// Fails without modifying the deck if any card is absent.
    pub fn remove(&mut self, cards: &[Card]) -> Result<(), EquityError> {
        if let Some(&missing) = cards.iter().find(|c| !self.cards.contains(c)) {
            return Err(EquityError::CardNotInDeck(missing));
        }
        self.cards.retain(|c| !cards.contains(c));
        Ok(())
    }

    /// Shuffle in place, then deal `opponent` cards followed by `board` cards
    /// from the top. The dealt cards leave the deck.
    pub fn shuffle_and_draw<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        opponent: usize,
        board: usize,
    ) -> Result<Draw, EquityError> {
        let needed = opponent + board;
        if needed > self.cards.len() {
            return Err(EquityError::DeckExhausted {
                available: self.cards.len(),
                needed,
            });
        }
        self.cards.shuffle(rng);
        let mut dealt = self.cards.drain(..needed);
        let opponent = dealt.by_ref().take(opponent).collect();
        let board = dealt.collect();
        Ok(Draw { opponent, board })
    }
}
