use crate::{Card, EquityError};

/// Number of community cards on a complete board.
pub const BOARD_SIZE: usize = 5;

/// Known cards for the hero: exactly two hole cards and up to five
/// community cards, all distinct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandState {
    hole: [Card; 2],
    community: Vec<Card>,
}

impl HandState {
    pub fn new(hole: &[Card], community: &[Card]) -> Result<Self, EquityError> {
        let hole: [Card; 2] = hole
            .try_into()
            .map_err(|_| EquityError::HoleCount(hole.len()))?;
        let total = hole.len() + community.len();
        if total > 2 + BOARD_SIZE {
            return Err(EquityError::TooManyCards(total));
        }

        let mut seen = [false; crate::DECK_SIZE as usize];
        for &card in hole.iter().chain(community) {
            let slot = &mut seen[card.id() as usize];
            if *slot {
                return Err(EquityError::DuplicateCard(card));
            }
            *slot = true;
        }

        Ok(Self {
            hole,
            community: community.to_vec(),
        })
    }

    /// Build from raw ids: the first two are hole cards, the rest community.
    pub fn from_ids(ids: &[u8]) -> Result<Self, EquityError> {
        let cards = ids
            .iter()
            .map(|&id| Card::new(id))
            .collect::<Result<Vec<_>, _>>()?;
        if cards.len() < 2 {
            return Err(EquityError::HoleCount(cards.len()));
        }
        let (hole, community) = cards.split_at(2);
        Self::new(hole, community)
    }

    #[inline]
    pub fn hole(&self) -> [Card; 2] {
        self.hole
    }

    #[inline]
    pub fn community(&self) -> &[Card] {
        &self.community
    }

    /// Hole and community cards, hole first.
    pub fn known(&self) -> Vec<Card> {
        self.hole.iter().chain(&self.community).copied().collect()
    }

    /// Community cards still to come.
    #[inline]
    pub fn board_needed(&self) -> usize {
        BOARD_SIZE - self.community.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(ids: &[u8]) -> Vec<Card> {
        ids.iter().map(|&id| Card::new(id).unwrap()).collect()
    }

    #[test]
    fn valid_states() {
        let preflop = HandState::new(&cards(&[0, 12]), &[]).unwrap();
        assert_eq!(preflop.board_needed(), 5);
        let river = HandState::from_ids(&[0, 13, 26, 27, 28, 1, 2]).unwrap();
        assert_eq!(river.board_needed(), 0);
        assert_eq!(river.hole(), [Card::new(0).unwrap(), Card::new(13).unwrap()]);
        assert_eq!(river.known().len(), 7);
    }

    #[test]
    fn wrong_hole_count() {
        assert_eq!(
            HandState::new(&cards(&[0]), &[]),
            Err(EquityError::HoleCount(1))
        );
        assert_eq!(
            HandState::new(&cards(&[0, 1, 2]), &[]),
            Err(EquityError::HoleCount(3))
        );
        assert_eq!(HandState::from_ids(&[]), Err(EquityError::HoleCount(0)));
    }

    #[test]
    fn too_many_cards() {
        assert_eq!(
            HandState::new(&cards(&[0, 1]), &cards(&[2, 3, 4, 5, 6, 7])),
            Err(EquityError::TooManyCards(8))
        );
    }

    #[test]
    fn duplicates_between_hole_and_board() {
        assert_eq!(
            HandState::new(&cards(&[0, 1]), &cards(&[2, 1])),
            Err(EquityError::DuplicateCard(Card::new(1).unwrap()))
        );
        assert_eq!(
            HandState::from_ids(&[9, 9]),
            Err(EquityError::DuplicateCard(Card::new(9).unwrap()))
        );
    }

    #[test]
    fn out_of_range_id() {
        assert_eq!(
            HandState::from_ids(&[0, 52]),
            Err(EquityError::CardOutOfRange(52))
        );
    }
}
