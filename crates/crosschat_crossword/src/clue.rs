use std::fmt;
use std::str::FromStr;

use crate::{Direction, Error};

/// Identifies an entry the way solvers name it: a clue number plus a
/// direction suffix, e.g. `"1a"` or `"100d"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClueId {
    pub number: u32,
    pub direction: Direction,
}

impl ClueId {
    pub fn new(number: u32, direction: Direction) -> Self {
        Self { number, direction }
    }
}

impl FromStr for ClueId {
    type Err = Error;

    /// Parse a clue identifier: a decimal number directly followed by `a`
    /// or `d`, case-insensitive, surrounding whitespace ignored
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let bad_clue = || Error::BadClue {
            clue: input.to_string(),
        };

        let id = input.trim().to_ascii_lowercase();
        let Some(suffix) = id.chars().last() else {
            return Err(bad_clue());
        };

        let direction = match suffix {
            'a' => Direction::Across,
            'd' => Direction::Down,
            _ => return Err(bad_clue()),
        };

        let number = &id[..id.len() - suffix.len_utf8()];

        // Parsing rejects the empty prefix, signs and inner whitespace
        let number: u32 = number.parse().map_err(|_| bad_clue())?;

        Ok(Self { number, direction })
    }
}

impl fmt::Display for ClueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.direction.suffix())
    }
}
