use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::{Store, StoreError, key_matches};

/// In-memory [`Store`] with TTL expiry, the default for development and the
/// fixture for tests
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<String, Row>>,
}

struct Row {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Row {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= Instant::now())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut rows = self.rows.write();

        match rows.get(key) {
            Some(row) if row.is_expired() => {
                rows.remove(key);
                Ok(None)
            }
            Some(row) => Ok(Some(row.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.rows.write().insert(
            key.to_string(),
            Row {
                value,
                expires_at: None,
            },
        );

        Ok(())
    }

    fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        self.rows.write().insert(
            key.to_string(),
            Row {
                value,
                expires_at: Some(Instant::now() + ttl),
            },
        );

        Ok(())
    }

    fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let rows = self.rows.read();

        let mut keys: Vec<String> = rows
            .iter()
            .filter(|(key, row)| !row.is_expired() && key_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();

        keys.sort();
        Ok(keys)
    }

    fn get_all(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, StoreError> {
        let rows = self.rows.read();

        Ok(keys
            .iter()
            .filter_map(|key| {
                let row = rows.get(key)?;
                (!row.is_expired()).then(|| (key.clone(), row.value.clone()))
            })
            .collect())
    }
}
