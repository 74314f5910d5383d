//! Consumer-facing cache trait.

use crate::cancel::CancellationToken;
use crate::error::Result;
use async_trait::async_trait;

/// Pluggable certificate cache, as consumed by an ACME certificate manager.
///
/// A manager calls `fetch` before issuing; `CertCacheError::NotFound` means
/// "nothing cached, issue a new certificate". Every other error is a fault.
#[async_trait]
pub trait CertificateCache: Send + Sync {
    /// Get the blob stored under `name`.
    async fn fetch(&self, cancel: &CancellationToken, name: &str) -> Result<Vec<u8>>;

    /// Store `data` under `name`, replacing any previous blob.
    async fn store(&self, cancel: &CancellationToken, name: &str, data: &[u8]) -> Result<()>;

    /// Remove the blob stored under `name`. Removing a missing name succeeds.
    async fn remove(&self, cancel: &CancellationToken, name: &str) -> Result<()>;
}
