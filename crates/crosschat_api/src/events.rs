use std::collections::BTreeMap;

use crosschat_crossword::{Settings, SolveState, Status};
use serde::{Deserialize, Serialize};

/// Envelope every SSE payload travels in: `{"kind": …, "payload": …}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Settings,
    State,
    #[serde(rename = "show_clue")]
    ShowClue,
    Ping,
    Channels,
}

/// One channel in the active-channels feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub name: String,
    pub status: Status,
}

/// Active channels per integration, the payload of a `channels` event
pub type ChannelsSnapshot = BTreeMap<String, Vec<ChannelSummary>>;

impl Event {
    pub fn settings(settings: &Settings) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: EventKind::Settings,
            payload: serde_json::to_value(settings)?,
        })
    }

    /// State event with the puzzle solution elided; nothing that leaves the
    /// server carries the answer grid
    pub fn state(state: &SolveState) -> Result<Self, serde_json::Error> {
        let mut outward = state.clone();
        outward.puzzle = outward.puzzle.without_solution();

        Ok(Self {
            kind: EventKind::State,
            payload: serde_json::to_value(&outward)?,
        })
    }

    pub fn show_clue(clue: &str) -> Self {
        Self {
            kind: EventKind::ShowClue,
            payload: serde_json::Value::String(clue.to_string()),
        }
    }

    pub fn ping() -> Self {
        Self {
            kind: EventKind::Ping,
            payload: serde_json::Value::Null,
        }
    }

    pub fn channels(snapshot: &ChannelsSnapshot) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: EventKind::Channels,
            payload: serde_json::to_value(snapshot)?,
        })
    }
}
