use std::{cmp::Ordering, fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{
    rank::Rank,
    result::{Error, Result},
    suite::Suite,
};

/// A single card, stored as `suite * 16 + rank` so it maps directly onto a
/// bit of [`crate::cards::Cards`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Card(i8);

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self, f)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank(), self.suite())
    }
}

impl FromStr for Card {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bytes(s.as_bytes())
    }
}

impl Card {
    pub const MIN: Self = Self(0);

    pub const COUNT: usize = Suite::COUNT * Rank::COUNT;

    pub const fn of(rank: Rank, suite: Suite) -> Self {
        Self(suite.to_index() + rank.to_i8())
    }

    pub fn from_index(index: i8) -> Option<Self> {
        if !(0..64).contains(&index) || index % 16 >= Rank::COUNT as i8 {
            None
        } else {
            Some(Self(index))
        }
    }

    pub fn from_bytes(s: &[u8]) -> Result<Self> {
        match s {
            [rank_raw, suite_raw] => {
                let rank = Rank::from_ascii(*rank_raw)?;
                let suite = Suite::from_ascii(*suite_raw)?;
                Ok(Self::of(rank, suite))
            }
            _ => Err(format!("invalid card '{}': bad length", String::from_utf8_lossy(s)).into()),
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Suite::SUITES
            .iter()
            .flat_map(|suite| Rank::RANKS.iter().map(|rank| Self::of(*rank, *suite)))
    }

    pub fn rank(self) -> Rank {
        Rank::RANKS[usize::from(self.0 as u8 % 16)]
    }

    pub fn suite(self) -> Suite {
        Suite::SUITES[usize::from(self.0 as u8 / 16)]
    }

    pub fn to_index(self) -> i8 {
        self.0
    }

    pub fn to_index_u64(self) -> u64 {
        self.0 as u64
    }

    pub fn cmp_by_rank(self, other: Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.suite().to_usize().cmp(&other.suite().to_usize()))
    }
}
