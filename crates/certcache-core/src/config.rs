//! Centralized configuration for the certificate cache.
//!
//! Everything here is a fixed constant; the cache has no runtime config file.

use std::time::Duration;

/// Cache-wide constants.
pub struct CacheConfig;

impl CacheConfig {
    /// Prefix that separates this cache's keys from other data in a shared store.
    ///
    /// Entries written under another prefix (for example `redicrypt/<name>`)
    /// are not visible to this cache; migrate them by renaming the keys.
    pub const KEY_PREFIX: &'static str = "certcache";
    pub const KEY_SEPARATOR: &'static str = "/";

    /// Backend address used by the CLI when none is given.
    pub const DEFAULT_ADDR: &'static str = "127.0.0.1:6379";
    /// How long construction waits for the backend before failing.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Address reported by caches built on the in-process backend.
    pub const MEMORY_ADDR: &'static str = "memory";
}
