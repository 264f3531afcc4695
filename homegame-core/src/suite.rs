use std::fmt;

use crate::result::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suite {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.to_ascii()))
    }
}

impl TryFrom<i8> for Suite {
    type Error = Error;

    fn try_from(n: i8) -> Result<Self> {
        usize::try_from(n)
            .ok()
            .and_then(|index| Self::SUITES.get(index).copied())
            .ok_or_else(|| format!("suite: index {n} out of range").into())
    }
}

impl Suite {
    pub const COUNT: usize = 4;

    pub const SUITES: [Self; Self::COUNT] =
        [Self::Spades, Self::Hearts, Self::Diamonds, Self::Clubs];

    pub fn from_ascii(ch: u8) -> Result<Self> {
        match ch {
            b's' => Ok(Self::Spades),
            b'h' => Ok(Self::Hearts),
            b'd' => Ok(Self::Diamonds),
            b'c' => Ok(Self::Clubs),
            _ => Err(format!("suite: invalid character '{}'", char::from(ch)).into()),
        }
    }

    pub fn to_ascii(self) -> u8 {
        b"shdc"[self.to_usize()]
    }

    pub const fn to_usize(self) -> usize {
        self as usize
    }

    /// Offset of the suite's 16 bit lane in a card index.
    pub const fn to_index(self) -> i8 {
        (self as i8) * 16
    }
}
