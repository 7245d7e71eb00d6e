//! Reader for the [Across Lite `*.puz` format](https://code.google.com/archive/p/puz/wikis/FileFormat.wiki)
//!
//! The format is a little-endian binary file: a fixed header, the solution
//! and fill grids, a block of NUL-terminated strings and a tail of framed
//! extension sections. Everything is validated against the format's own
//! 16-bit checksums before a puzzle is handed out; files whose solution has
//! been "locked" with the scramble cipher are unlocked by exhaustive key
//! search. Reading is all-or-nothing: any failed check aborts the decode.
//!
//! The crate does not define a puzzle type of its own. Instead, consumers
//! implement [`Puz`] to assemble their own representation from the parsed
//! [`Header`], [`Grids`], [`Strings`] and [`Extras`].

pub mod read;

mod checksums;
mod extras;
mod grids;
mod header;
mod scramble;
mod strings;
mod version;

pub use checksums::*;
pub use extras::*;
pub use grids::*;
pub use header::*;
pub use strings::*;
pub use version::*;

pub use read::{PuzRead, PuzReader};

/// Conversion from the parsed `*.puz` components into a puzzle type
pub trait Puz: Sized {
    fn from_puz(
        header: Header,
        grids: Grids,
        strings: Strings,
        extras: Extras,
    ) -> read::Result<Self>;
}

/// Extension trait to attach the currently-parsed region to an error
pub trait Context<T> {
    fn context<S: Into<String>>(self, context: S) -> read::Result<T>;
}

impl<T> Context<T> for std::io::Result<T> {
    fn context<S: Into<String>>(self, context: S) -> read::Result<T> {
        self.map_err(|err| read::Error {
            kind: read::ErrorKind::Io(err),
            context: context.into(),
        })
    }
}
