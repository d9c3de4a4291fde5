use std::{collections::HashMap, time::Duration};

use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub data: String,
    pub expiration: Option<Instant>,
}

impl Value {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expiration, Some(expiration) if now >= expiration)
    }
}

/// String keyspace with lazily evaluated millisecond expiry.
///
/// Expired entries are only removed when a read touches them, there is no
/// background sweep.
#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<String, Value>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        KeyValueStore {
            entries: HashMap::new(),
        }
    }

    /// Returns the live value for `key`, dropping it first if it expired.
    pub fn get(&mut self, key: &str) -> Option<String> {
        if self.entries.get(key)?.is_expired(Instant::now()) {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|value| value.data.clone())
    }

    pub fn set(&mut self, key: String, value: String) {
        self.entries.insert(
            key,
            Value {
                data: value,
                expiration: None,
            },
        );
    }

    pub fn set_px(&mut self, key: String, value: String, ttl_millis: u64) {
        self.entries.insert(
            key,
            Value {
                data: value,
                expiration: Some(Instant::now() + Duration::from_millis(ttl_millis)),
            },
        );
    }

    /// Raw entry lookup that does not evaluate expiry.
    pub fn peek(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
