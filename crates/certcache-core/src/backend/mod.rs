//! Key-value backends for the certificate cache.
//!
//! The cache talks to its store through the `KvBackend` trait:
//! - `RedisBackend` is the production backend (one multiplexed connection)
//! - `MemoryBackend` keeps entries in-process, for tests and local development

mod memory;
mod redis;
mod traits;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;
pub use self::traits::KvBackend;
