use rand::Rng;

use crate::{card::Card, cards::Cards, hand::Hand};

/// The cards not yet assigned to any player or the board.
pub struct Deck {
    cards: [Card; Card::COUNT],
    max_len: usize,
    len: usize,
}

impl Deck {
    pub fn from_cards(known_cards: Cards) -> Self {
        let mut cards = [Card::MIN; Card::COUNT];
        let mut index = 0;
        for card in (!known_cards).iter() {
            cards[index] = card;
            index += 1;
        }
        Deck {
            cards,
            max_len: index,
            len: index,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn draw(&mut self, rng: &mut impl Rng) -> Option<Card> {
        if self.len == 0 {
            None
        } else {
            let index = rng.gen_range(0..self.len);
            let card = self.cards[index];
            self.cards.swap(index, self.len - 1);
            self.len -= 1;
            Some(card)
        }
    }

    pub fn hand(&mut self, rng: &mut impl Rng) -> Option<Hand> {
        let a = self.draw(rng)?;
        let b = self.draw(rng)?;
        Hand::of_two_cards(a, b)
    }

    /// Puts every drawn card back.
    pub fn reset(&mut self) {
        self.len = self.max_len;
    }
}
