mod memory;

pub use memory::*;

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

/// The opaque key-value persistence contract of the engine
///
/// A production deployment points this at Redis; the engine itself only
/// ever sees byte blobs behind string keys. Rows written with a TTL expire
/// on their own; `scan_keys` matches Redis-style glob patterns (`*` and
/// `?`).
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError>;

    fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    fn get_all(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend: {0}")]
    Backend(String),

    #[error("stored row cannot be decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Redis-style glob match: `*` spans any run, `?` one character
pub(crate) fn key_matches(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    fn matches(pattern: &[char], key: &[char]) -> bool {
        match (pattern.first(), key.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                matches(&pattern[1..], key)
                    || (!key.is_empty() && matches(pattern, &key[1..]))
            }
            (Some('?'), Some(_)) => matches(&pattern[1..], &key[1..]),
            (Some(expected), Some(found)) if expected == found => {
                matches(&pattern[1..], &key[1..])
            }
            _ => false,
        }
    }

    matches(&pattern, &key)
}
