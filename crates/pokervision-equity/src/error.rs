use crate::Card;

/// Malformed hands, decks or trial counts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EquityError {
    #[error("card id {0} is outside 0..52")]
    CardOutOfRange(u8),
    #[error("expected exactly 2 hole cards, got {0}")]
    HoleCount(usize),
    #[error("{0} known cards exceed the 7 a hand can hold")]
    TooManyCards(usize),
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("card {0} is not in the deck")]
    CardNotInDeck(Card),
    #[error("deck holds {available} cards but {needed} are needed")]
    DeckExhausted { available: usize, needed: usize },
    #[error("trial count must be positive")]
    NoTrials,
}
