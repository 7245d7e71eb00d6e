//! Shared substrate for the crosschat crates: a row-major 2-dimensional
//! [`Grid`] and the [`Position`] type used to address it.

mod grid;
mod position;

pub use grid::*;
pub use position::*;
