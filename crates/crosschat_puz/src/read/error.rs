use std::fmt;

use thiserror::Error;

/// Error raised while reading a `*.puz` stream
///
/// The [`kind`](Error::kind) carries what went wrong, the
/// [`context`](Error::context) which region was being parsed at the time.
#[derive(Debug, Error)]
#[error("{kind} while reading '{context}'")]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn bad_format<R, C>(reason: R, context: C) -> Self
    where
        R: Into<String>,
        C: Into<String>,
    {
        Self {
            kind: ErrorKind::BadFormat {
                reason: reason.into(),
            },
            context: context.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("malformed file: {reason}")]
    BadFormat { reason: String },

    #[error("invalid checksum {computed:#06x}, expected {stored:#06x}")]
    ChecksumMismatch { computed: u16, stored: u16 },

    #[error("no key in 1000..=9999 unlocks the scrambled solution")]
    CannotUnscramble,

    #[error("{0}")]
    Encoding(#[from] EncodingErrors),
}

/// Aggregate of every byte that failed to decode as Windows-1252
#[derive(Debug, Default)]
pub struct EncodingErrors {
    pub problems: Vec<EncodingProblem>,
}

impl EncodingErrors {
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

impl fmt::Display for EncodingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} undecodable byte(s):", self.problems.len())?;

        for problem in &self.problems {
            write!(f, " {:#04x} in {}", problem.byte, problem.field)?;
        }

        Ok(())
    }
}

impl std::error::Error for EncodingErrors {}

#[derive(Debug)]
pub struct EncodingProblem {
    /// The offending byte
    pub byte: u8,
    /// Which string it was found in
    pub field: String,
}

pub type Result<T> = core::result::Result<T, Error>;
