use crosschat_core::Position;
use thiserror::Error;

use crate::Status;

/// Failures of the solve operations, one variant per caller-visible kind
#[derive(Debug, Error)]
pub enum Error {
    #[error("'{clue}' does not identify a clue of this puzzle")]
    BadClue { clue: String },

    #[error("cannot parse the answer: {reason}")]
    BadAnswer { reason: String },

    #[error("the answer covers {found} cell(s) but the entry has {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("cell {pos} already holds a letter")]
    ChangesCorrect { pos: Position },

    #[error("cell {pos} would be filled incorrectly")]
    WritesIncorrect { pos: Position },

    #[error("not allowed while the puzzle is {status}")]
    StateConflict { status: Status },

    #[error("'{token}' is not a recognized value")]
    BadEnum { token: String },
}

pub type Result<T> = core::result::Result<T, Error>;
