use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a channel's solve
///
/// Wire tokens are the lowercase variant names; anything else fails to
/// deserialize.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// A puzzle is selected but solving has not started
    #[default]
    Created,

    /// Solving is suspended; the timer does not run
    Paused,

    /// The solve is underway; the timer runs
    Solving,

    /// Every cell matches the solution; terminal
    Complete,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Status::Created => "created",
            Status::Paused => "paused",
            Status::Solving => "solving",
            Status::Complete => "complete",
        };

        write!(f, "{token}")
    }
}
