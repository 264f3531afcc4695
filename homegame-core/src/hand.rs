use std::{cmp::Ordering, fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{
    card::Card,
    cards::Cards,
    result::{Error, Result},
};

/// Two hole cards, the higher card first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Hand(Card, Card);

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.high(), self.low())
    }
}

impl fmt::Debug for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl FromStr for Hand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_cards(Cards::from_bytes(s.as_bytes())?)
    }
}

impl Hand {
    pub fn of_two_cards(a: Card, b: Card) -> Option<Self> {
        match a.cmp_by_rank(b) {
            Ordering::Less => Some(Self(b, a)),
            Ordering::Equal => None,
            Ordering::Greater => Some(Self(a, b)),
        }
    }

    fn from_cards(cards: Cards) -> Result<Self> {
        cards
            .to_hand()
            .ok_or_else(|| format!("hand: expected 2 cards, got {}", cards.count()).into())
    }

    pub fn from_slice(cards: &[Card]) -> Result<Self> {
        match cards {
            [a, b] => Self::of_two_cards(*a, *b)
                .ok_or_else(|| format!("hand: duplicate card {a}").into()),
            _ => Err(format!("hand: expected 2 cards, got {}", cards.len()).into()),
        }
    }

    pub fn high(self) -> Card {
        self.0
    }

    pub fn low(self) -> Card {
        self.1
    }

    pub fn suited(self) -> bool {
        self.high().suite() == self.low().suite()
    }

    pub fn to_cards(self) -> Cards {
        Cards::EMPTY.with(self.high()).with(self.low())
    }

    /// Every two card hand that can be built from `cards`.
    pub fn all_from(cards: Cards) -> Vec<Self> {
        let cards = cards.to_vec();
        let mut hands = Vec::with_capacity(cards.len() * cards.len().saturating_sub(1) / 2);
        for (i, a) in cards.iter().copied().enumerate() {
            for b in cards[i + 1..].iter().copied() {
                if let Some(hand) = Self::of_two_cards(a, b) {
                    hands.push(hand);
                }
            }
        }
        hands
    }
}
