//! State and settings rows behind the [`Store`] contract
//!
//! Solve state carries a 4-hour TTL that is pushed out again every time the
//! row is read, so a channel stays alive exactly as long as somebody looks
//! at it. Settings rows never expire.

use std::time::Duration;

use crosschat_crossword::{Settings, SolveState};

use crate::storage::{Store, StoreError};

/// How long an untouched solve survives
pub const STATE_TTL: Duration = Duration::from_secs(4 * 60 * 60);

const STATE_PREFIX: &str = "crossword:state:";
const SETTINGS_PREFIX: &str = "crossword:settings:";

fn state_key(channel: &str) -> String {
    format!("{STATE_PREFIX}{channel}")
}

fn settings_key(channel: &str) -> String {
    format!("{SETTINGS_PREFIX}{channel}")
}

/// Load a channel's solve state, refreshing its TTL on the way
pub fn load_state(store: &dyn Store, channel: &str) -> Result<Option<SolveState>, StoreError> {
    let key = state_key(channel);

    let Some(bytes) = store.get(&key)? else {
        return Ok(None);
    };

    store.set_with_ttl(&key, bytes.clone(), STATE_TTL)?;

    let state = serde_json::from_slice(&bytes)?;
    Ok(Some(state))
}

pub fn save_state(store: &dyn Store, channel: &str, state: &SolveState) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(state)?;
    store.set_with_ttl(&state_key(channel), bytes, STATE_TTL)
}

/// Load a channel's settings; channels without a row use the defaults
pub fn load_settings(store: &dyn Store, channel: &str) -> Result<Settings, StoreError> {
    match store.get(&settings_key(channel))? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Settings::default()),
    }
}

pub fn save_settings(
    store: &dyn Store,
    channel: &str,
    settings: &Settings,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(settings)?;
    store.set(&settings_key(channel), bytes)
}

/// Names of every channel that currently has a solve state
pub fn active_channels(store: &dyn Store) -> Result<Vec<String>, StoreError> {
    let keys = store.scan_keys(&format!("{STATE_PREFIX}*"))?;

    Ok(keys
        .into_iter()
        .filter_map(|key| key.strip_prefix(STATE_PREFIX).map(str::to_string))
        .collect())
}

/// State rows of every active channel, keyed by channel name
pub fn all_states(store: &dyn Store) -> Result<Vec<(String, SolveState)>, StoreError> {
    let keys = store.scan_keys(&format!("{STATE_PREFIX}*"))?;
    let rows = store.get_all(&keys)?;

    let mut states = Vec::with_capacity(rows.len());
    for (key, bytes) in rows {
        let Some(channel) = key.strip_prefix(STATE_PREFIX) else {
            continue;
        };

        states.push((channel.to_string(), serde_json::from_slice(&bytes)?));
    }

    states.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(states)
}
