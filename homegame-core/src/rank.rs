use std::fmt;

use crate::result::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.to_ascii()))
    }
}

impl TryFrom<i8> for Rank {
    type Error = Error;

    fn try_from(n: i8) -> Result<Self> {
        usize::try_from(n)
            .ok()
            .and_then(|index| Self::RANKS.get(index).copied())
            .ok_or_else(|| format!("rank: index {n} out of range").into())
    }
}

impl Rank {
    pub const COUNT: usize = 13;

    pub const RANKS: [Self; Self::COUNT] = [
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
        Self::Ace,
    ];

    pub fn from_ascii(ch: u8) -> Result<Self> {
        let rank = match ch {
            b'2' => Self::Two,
            b'3' => Self::Three,
            b'4' => Self::Four,
            b'5' => Self::Five,
            b'6' => Self::Six,
            b'7' => Self::Seven,
            b'8' => Self::Eight,
            b'9' => Self::Nine,
            b'T' => Self::Ten,
            b'J' => Self::Jack,
            b'Q' => Self::Queen,
            b'K' => Self::King,
            b'A' => Self::Ace,
            _ => {
                return Err(format!("rank: invalid character '{}'", char::from(ch)).into());
            }
        };
        Ok(rank)
    }

    pub fn to_ascii(self) -> u8 {
        b"23456789TJQKA"[self.to_usize()]
    }

    pub const fn to_i8(self) -> i8 {
        self as i8
    }

    pub const fn to_usize(self) -> usize {
        self as usize
    }

    /// Single bit in a 13 bit rank mask.
    pub const fn to_mask(self) -> u16 {
        1 << (self as u16)
    }
}
