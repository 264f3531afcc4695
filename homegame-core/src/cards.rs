use std::{
    fmt,
    ops::{BitAnd, BitOr, Not},
    str::FromStr,
};

use crate::{
    card::Card,
    evaluator::{self, HandRank},
    hand::Hand,
    result::{Error, Result},
    suite::Suite,
};

/// A set of distinct cards. Bit `suite * 16 + rank` is set for every member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cards(u64);

impl fmt::Display for Cards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in self.iter() {
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Cards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cards({self})")
    }
}

impl FromStr for Cards {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bytes(s.as_bytes())
    }
}

impl Not for Cards {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(!self.0 & Self::MASK_FULL)
    }
}

impl BitAnd for Cards {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Cards {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl Cards {
    pub const EMPTY: Self = Self(0);

    const MASK_LANE: u64 = 0x1fff;

    pub const MASK_FULL: u64 = Self::MASK_LANE
        | Self::MASK_LANE << 16
        | Self::MASK_LANE << 32
        | Self::MASK_LANE << 48;

    pub const FULL: Self = Self(Self::MASK_FULL);

    pub fn from_slice(cards: &[Card]) -> Result<Self> {
        let mut out = Self::EMPTY;
        for card in cards.iter().copied() {
            if !out.try_add(card) {
                return Err(format!("cards: duplicate card {card}").into());
            }
        }
        Ok(out)
    }

    /// Parses concatenated two character cards, e.g. `QhJh2c`.
    pub fn from_bytes(s: &[u8]) -> Result<Self> {
        if s.len() % 2 != 0 {
            return Err(format!("cards: invalid length in '{}'", String::from_utf8_lossy(s)).into());
        }
        let mut out = Self::EMPTY;
        for raw in s.chunks_exact(2) {
            let card = Card::from_bytes(raw)?;
            if !out.try_add(card) {
                return Err(format!("cards: duplicate card {card}").into());
            }
        }
        Ok(out)
    }

    pub fn with(self, card: Card) -> Self {
        Self(self.0 | 1 << card.to_index_u64())
    }

    pub fn add(&mut self, card: Card) {
        *self = self.with(card);
    }

    /// Returns false and leaves the set unchanged if the card is present.
    pub fn try_add(&mut self, card: Card) -> bool {
        if self.has(card) {
            false
        } else {
            self.add(card);
            true
        }
    }

    pub fn remove(&mut self, card: Card) {
        self.0 &= !(1 << card.to_index_u64());
    }

    pub fn has(self, card: Card) -> bool {
        self.0 & (1 << card.to_index_u64()) != 0
    }

    pub fn count(self) -> u8 {
        self.0.count_ones() as u8
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_disjoint(self, other: Self) -> bool {
        self.0 & other.0 == 0
    }

    pub fn first(self) -> Option<Card> {
        if self.0 == 0 {
            None
        } else {
            Card::from_index(self.0.trailing_zeros() as i8)
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Card> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let index = bits.trailing_zeros();
            bits &= bits - 1;
            Card::from_index(index as i8)
        })
    }

    pub fn to_vec(self) -> Vec<Card> {
        self.iter().collect()
    }

    pub fn to_hand(self) -> Option<Hand> {
        let mut iter = self.iter();
        match (iter.next(), iter.next(), iter.next()) {
            (Some(a), Some(b), None) => Hand::of_two_cards(a, b),
            _ => None,
        }
    }

    /// 13 bit rank mask of one suite.
    pub fn lane(self, suite: Suite) -> u16 {
        ((self.0 >> (suite.to_usize() * 16)) & Self::MASK_LANE) as u16
    }

    /// Best five card rank of the set. The set should hold 5 to 7 cards,
    /// use [`evaluator::evaluate`] for unchecked input.
    pub fn hand_rank(self) -> HandRank {
        evaluator::rank_lanes(Suite::SUITES.map(|suite| self.lane(suite)))
    }
}
