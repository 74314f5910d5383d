//! Key derivation and the text-safe value codec.
//!
//! Keys on the wire are `certcache/<name>`; values are standard (padded)
//! base64 of the raw blob. Names are not escaped, so callers must not pick
//! names that collide once concatenated.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::CacheConfig;
use crate::error::{CertCacheError, Result};

/// Derive the backend key for a logical name.
pub fn key_for_name(name: &str) -> String {
    format!(
        "{}{}{}",
        CacheConfig::KEY_PREFIX,
        CacheConfig::KEY_SEPARATOR,
        name
    )
}

/// Encode a raw blob for storage.
pub fn encode_value(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a stored value read from `key`.
pub fn decode_value(key: &str, raw: &[u8]) -> Result<Vec<u8>> {
    STANDARD.decode(raw).map_err(|e| CertCacheError::Decode {
        key: key.to_string(),
        source: e,
    })
}
