use std::fmt;

use serde::Serialize;

use crate::{card::Card, cards::Cards, rank::Rank, result::Result};

const WHEEL: u16 = Rank::Ace.to_mask()
    | Rank::Two.to_mask()
    | Rank::Three.to_mask()
    | Rank::Four.to_mask()
    | Rank::Five.to_mask();

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HighCard,
    Pair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::Pair => "pair",
            Self::TwoPair => "two pair",
            Self::Trips => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::Quads => "four of a kind",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

impl Category {
    /// Length of the tie break sequence, the category's own ranks included.
    pub fn kicker_count(self) -> usize {
        match self {
            Self::HighCard | Self::Flush => 5,
            Self::Pair => 4,
            Self::TwoPair | Self::Trips => 3,
            Self::FullHouse | Self::Quads => 2,
            Self::Straight | Self::StraightFlush => 1,
        }
    }
}

/// Up to five ranks packed four bits each, most significant first, so the
/// numeric order is the lexicographic order of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Kickers(u32);

impl Kickers {
    pub const EMPTY: Self = Self(0);

    /// Appends a rank after the ones already present.
    fn with(self, rank: Rank) -> Self {
        let slot = if self.0 == 0 {
            0
        } else {
            5 - self.0.trailing_zeros() / 4
        };
        debug_assert!(slot < 5);
        Self(self.0 | (rank.to_usize() as u32 + 1) << (4 * (4 - slot)))
    }

    /// Appends the highest `n` ranks of a rank mask.
    fn with_top(mut self, mut mask: u16, n: usize) -> Self {
        for _ in 0..n {
            if mask == 0 {
                break;
            }
            let rank = highest(mask);
            self = self.with(rank);
            mask &= !rank.to_mask();
        }
        self
    }

    pub fn iter(self) -> impl Iterator<Item = Rank> {
        (0..5)
            .map(move |i| ((self.0 >> (4 * (4 - i))) & 0xf) as usize)
            .take_while(|nibble| *nibble != 0)
            .map(|nibble| Rank::RANKS[nibble - 1])
    }
}

/// Comparable strength of the best five card selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank {
    category: Category,
    kickers: Kickers,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.category)?;
        for (i, rank) in self.kickers.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{rank}")?;
        }
        write!(f, ")")
    }
}

impl HandRank {
    /// Lower than every real hand.
    pub const ZERO: Self = Self {
        category: Category::HighCard,
        kickers: Kickers::EMPTY,
    };

    fn new(category: Category, kickers: Kickers) -> Self {
        Self { category, kickers }
    }

    pub fn category(self) -> Category {
        self.category
    }

    pub fn kickers(self) -> Vec<Rank> {
        self.kickers.iter().collect()
    }
}

fn highest(mask: u16) -> Rank {
    debug_assert_ne!(mask, 0);
    Rank::RANKS[15 - mask.leading_zeros() as usize]
}

fn straight_top(mask: u16) -> Option<Rank> {
    let run = mask & (mask << 1) & (mask << 2) & (mask << 3) & (mask << 4);
    if run != 0 {
        Some(highest(run))
    } else if mask & WHEEL == WHEEL {
        Some(Rank::Five)
    } else {
        None
    }
}

/// Ranks a set of cards given as one 13 bit rank mask per suite.
pub(crate) fn rank_lanes(lanes: [u16; 4]) -> HandRank {
    let [a, b, c, d] = lanes;
    let ranks = a | b | c | d;
    let quads = a & b & c & d;
    let trips_or_more = (a & b & c) | (a & b & d) | (a & c & d) | (b & c & d);
    let pairs_or_more = (a & b) | (a & c) | (a & d) | (b & c) | (b & d) | (c & d);
    let trips = trips_or_more & !quads;
    let pairs = pairs_or_more & !trips_or_more;

    let flush = lanes.iter().copied().find(|lane| lane.count_ones() >= 5);
    if let Some(top) = flush.and_then(straight_top) {
        return HandRank::new(Category::StraightFlush, Kickers::EMPTY.with(top));
    }

    if quads != 0 {
        let quad = highest(quads);
        let kickers = Kickers::EMPTY
            .with(quad)
            .with_top(ranks & !quad.to_mask(), 1);
        return HandRank::new(Category::Quads, kickers);
    }

    if trips != 0 {
        let trip = highest(trips);
        let rest = (trips & !trip.to_mask()) | pairs;
        if rest != 0 {
            let kickers = Kickers::EMPTY.with(trip).with(highest(rest));
            return HandRank::new(Category::FullHouse, kickers);
        }
    }

    if let Some(lane) = flush {
        return HandRank::new(Category::Flush, Kickers::EMPTY.with_top(lane, 5));
    }

    if let Some(top) = straight_top(ranks) {
        return HandRank::new(Category::Straight, Kickers::EMPTY.with(top));
    }

    if trips != 0 {
        let trip = highest(trips);
        let kickers = Kickers::EMPTY
            .with(trip)
            .with_top(ranks & !trip.to_mask(), 2);
        return HandRank::new(Category::Trips, kickers);
    }

    if pairs.count_ones() >= 2 {
        let high = highest(pairs);
        let low = highest(pairs & !high.to_mask());
        let kickers = Kickers::EMPTY
            .with(high)
            .with(low)
            .with_top(ranks & !high.to_mask() & !low.to_mask(), 1);
        return HandRank::new(Category::TwoPair, kickers);
    }

    if pairs != 0 {
        let pair = highest(pairs);
        let kickers = Kickers::EMPTY
            .with(pair)
            .with_top(ranks & !pair.to_mask(), 3);
        return HandRank::new(Category::Pair, kickers);
    }

    HandRank::new(Category::HighCard, Kickers::EMPTY.with_top(ranks, 5))
}

fn checked_cards(cards: &[Card]) -> Result<Cards> {
    if cards.len() < 5 || cards.len() > 7 {
        return Err(format!("evaluate: expected 5 to 7 cards, got {}", cards.len()).into());
    }
    Cards::from_slice(cards)
}

/// Best rank of 5, 6 or 7 distinct cards.
pub fn evaluate(cards: &[Card]) -> Result<HandRank> {
    Ok(checked_cards(cards)?.hand_rank())
}

/// Tries every five card subset and returns the winning one with its rank.
pub fn best_five(cards: &[Card]) -> Result<(HandRank, [Card; 5])> {
    checked_cards(cards)?;
    let mut best: Option<(HandRank, [Card; 5])> = None;
    for subset in 0u32..(1 << cards.len()) {
        if subset.count_ones() != 5 {
            continue;
        }
        let mut five = [Card::MIN; 5];
        let selected = cards
            .iter()
            .enumerate()
            .filter(|(i, _)| subset & (1 << i) != 0)
            .map(|(_, card)| *card);
        for (slot, card) in five.iter_mut().zip(selected) {
            *slot = card;
        }
        let rank = Cards::from_slice(&five)?.hand_rank();
        if best.map_or(true, |(best_rank, _)| rank > best_rank) {
            best = Some((rank, five));
        }
    }
    best.ok_or_else(|| "evaluate: no five card subset".into())
}
