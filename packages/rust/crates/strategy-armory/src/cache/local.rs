//! In-process cache store.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::{CacheError, CacheStore, decode_int};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// `DashMap`-backed cache store with lazy per-key expiry.
///
/// Values are kept as text so integer decoding behaves like the Valkey backend.
#[derive(Debug, Default)]
pub struct LocalCacheStore {
    entries: DashMap<String, Entry>,
}

impl LocalCacheStore {
    /// Create an empty local store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys starting with `prefix`, sorted.
    #[must_use]
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    fn insert(&self, key: &str, value: String, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
    }

    fn read(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let live = self
            .entries
            .get(key)
            .map(|entry| (entry.is_live(now), entry.value.clone()));
        match live {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                self.entries.remove_if(key, |_, entry| !entry.is_live(now));
                None
            }
            None => None,
        }
    }
}

impl CacheStore for LocalCacheStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), CacheError> {
        self.insert(key, value.to_string(), None);
        Ok(())
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, CacheError> {
        self.read(key).map(|raw| decode_int(key, raw)).transpose()
    }

    fn set_text(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.insert(key, value.to_string(), ttl);
        Ok(())
    }

    fn get_text(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.read(key))
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}
