use std::fmt;

use crosschat_core::Position;

/// Direction of an entry within a [puzzle](crate::Puzzle)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// Across direction (horizontal)
    #[default]
    Across,

    /// Down direction (vertical)
    Down,
}

impl Direction {
    /// One-letter suffix used by clue identifiers such as `"4a"`
    pub fn suffix(self) -> char {
        match self {
            Direction::Across => 'a',
            Direction::Down => 'd',
        }
    }

    /// The next position along this direction
    pub(crate) fn next(self, pos: Position) -> Position {
        match self {
            Direction::Across => Position::new(pos.row, pos.col + 1),
            Direction::Down => Position::new(pos.row + 1, pos.col),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}
