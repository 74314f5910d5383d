//! Backend trait.

use crate::error::Result;
use async_trait::async_trait;

/// A flat string-keyed store supporting GET, SET and DEL.
///
/// Implementations must be safe to call concurrently from several tasks; the
/// cache adds no locking of its own and shares one backend across callers.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key does not exist. Transport and protocol
    /// failures are errors, never `None`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete `key`.
    ///
    /// Returns true if a value was removed. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Human-readable location of the store, for diagnostics.
    fn describe(&self) -> String;
}
