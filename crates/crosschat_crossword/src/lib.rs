//! The crossword domain of the crosschat engine
//!
//! A [`Puzzle`] is the immutable logical crossword: grid contents, clue
//! numbers, clue texts and metadata. A channel solves a puzzle through a
//! [`SolveState`], which owns the partially filled grid, the per-clue
//! filled maps, the solve [`Status`] and the timer. Everything a user types
//! arrives as text and passes through the two small grammars in this crate:
//! [`ClueId`] for `"4a"`-style clue identifiers and [`parse_answer`] for
//! answers with rebus groups and unknown-cell markers.

mod answer;
mod clue;
mod direction;
mod error;
mod puzzle;
mod settings;
mod solve;
mod status;

pub use answer::*;
pub use clue::*;
pub use direction::*;
pub use error::*;
pub use puzzle::*;
pub use settings::*;
pub use solve::*;
pub use status::*;
