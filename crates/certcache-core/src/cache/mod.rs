//! Certificate cache over a key-value backend.
//!
//! `CertCache` maps logical names to opaque blobs stored in a shared
//! backend. Each operation is a single live round-trip raced against the
//! caller's cancellation token; nothing is cached in-process.

mod builder;
mod cert_cache;
mod traits;

pub use builder::CertCacheBuilder;
pub use cert_cache::CertCache;
pub use traits::CertificateCache;
