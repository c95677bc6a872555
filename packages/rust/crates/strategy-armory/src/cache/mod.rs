//! Key-value cache backends holding assembled tables.
//!
//! The cache store is the only shared mutable resource: each call is atomic
//! per key, there is no cross-key transaction.

mod local;
#[cfg(feature = "valkey")]
mod valkey;

use std::time::Duration;

use thiserror::Error;

pub use local::LocalCacheStore;
#[cfg(feature = "valkey")]
pub use valkey::ValkeyCacheStore;

/// Cache-layer failures.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend could not serve the call.
    #[error("{backend} backend: {reason}")]
    Unavailable {
        /// Backend identifier.
        backend: &'static str,
        /// Underlying failure.
        reason: String,
    },

    /// A stored value does not decode as the requested type.
    #[error("value under `{key}` is not an integer: {value:?}")]
    Decode {
        /// Key read.
        key: String,
        /// Raw stored value.
        value: String,
    },
}

/// Persistence abstraction for probability tables and configuration caches.
pub trait CacheStore: Send + Sync {
    /// Backend identifier for logs.
    fn backend_name(&self) -> &'static str;

    /// Store an integer without expiry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the backend call fails.
    fn set_int(&self, key: &str, value: i64) -> Result<(), CacheError>;

    /// Read an integer.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the backend call fails and
    /// [`CacheError::Decode`] if the stored value is not an integer.
    fn get_int(&self, key: &str) -> Result<Option<i64>, CacheError>;

    /// Store many integers as independent per-key writes, in order.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure; earlier entries stay written.
    fn set_ints(&self, entries: &[(String, i64)]) -> Result<(), CacheError> {
        for (key, value) in entries {
            self.set_int(key, *value)?;
        }
        Ok(())
    }

    /// Store text, optionally expiring after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the backend call fails.
    fn set_text(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Read text.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the backend call fails.
    fn get_text(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Remove a key; missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the backend call fails.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

pub(crate) fn decode_int(key: &str, raw: String) -> Result<i64, CacheError> {
    raw.trim().parse::<i64>().map_err(|_| CacheError::Decode {
        key: key.to_string(),
        value: raw,
    })
}
