//! Valkey-backed cache store (blocking connections).

use std::time::Duration;

use redis::{Commands, RedisError};

use super::{CacheError, CacheStore, decode_int};

const BACKEND: &str = "valkey";

fn unavailable(operation: &str, error: &RedisError) -> CacheError {
    CacheError::Unavailable {
        backend: BACKEND,
        reason: format!("{operation} failed: {error}"),
    }
}

/// Valkey cache store; opens one connection per call.
pub struct ValkeyCacheStore {
    client: redis::Client,
}

impl ValkeyCacheStore {
    /// Create a Valkey cache store.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the URL is not a valid redis URL.
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, CacheError> {
        let redis_url = redis_url.as_ref();
        let client = redis::Client::open(redis_url).map_err(|error| CacheError::Unavailable {
            backend: BACKEND,
            reason: format!("invalid redis url {redis_url}: {error}"),
        })?;
        Ok(Self { client })
    }

    fn connection(&self) -> Result<redis::Connection, CacheError> {
        self.client
            .get_connection()
            .map_err(|error| unavailable("connect", &error))
    }
}

impl CacheStore for ValkeyCacheStore {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), CacheError> {
        self.connection()?
            .set::<_, _, ()>(key, value)
            .map_err(|error| unavailable("SET", &error))
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, CacheError> {
        let raw: Option<String> = self
            .connection()?
            .get(key)
            .map_err(|error| unavailable("GET", &error))?;
        raw.map(|raw| decode_int(key, raw)).transpose()
    }

    fn set_ints(&self, entries: &[(String, i64)]) -> Result<(), CacheError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        for (key, value) in entries {
            pipe.set(key, *value).ignore();
        }
        pipe.query::<()>(&mut self.connection()?)
            .map_err(|error| unavailable("pipelined SET", &error))
    }

    fn set_text(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut connection = self.connection()?;
        match ttl {
            Some(ttl) => connection
                .set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                .map_err(|error| unavailable("SETEX", &error)),
            None => connection
                .set::<_, _, ()>(key, value)
                .map_err(|error| unavailable("SET", &error)),
        }
    }

    fn get_text(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.connection()?
            .get(key)
            .map_err(|error| unavailable("GET", &error))
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.connection()?
            .del::<_, ()>(key)
            .map_err(|error| unavailable("DEL", &error))
    }
}
