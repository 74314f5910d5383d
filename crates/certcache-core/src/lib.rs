//! certcache - Redis-backed certificate cache for ACME certificate managers.
//!
//! Stores opaque blobs (certificates, account keys) under logical names in a
//! shared key-value store so several server processes can reuse the same
//! certificates. A miss is reported as `CertCacheError::NotFound`, which a
//! certificate manager treats as "issue a new one".
//!
//! # Example
//!
//! ```rust,ignore
//! use certcache::{CancellationToken, CertCache};
//!
//! #[tokio::main]
//! async fn main() -> certcache::Result<()> {
//!     let cache = CertCache::connect("127.0.0.1:6379").await?;
//!     let cancel = CancellationToken::new();
//!
//!     cache.store(&cancel, "example.com", b"cert bytes").await?;
//!     let cert = cache.fetch(&cancel, "example.com").await?;
//!     assert_eq!(cert, b"cert bytes");
//!
//!     cache.remove(&cancel, "example.com").await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cache;
pub mod cancel;
pub mod config;
pub mod encoding;
pub mod error;

// Re-export commonly used types
pub use backend::{KvBackend, MemoryBackend, RedisBackend};
pub use cache::{CertCache, CertCacheBuilder, CertificateCache};
pub use cancel::{CancellationToken, CancelledError};
pub use config::CacheConfig;
pub use encoding::key_for_name;
pub use error::{CertCacheError, Result};
