//! The certificate cache itself.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;
use tracing::{debug, warn, Dispatch};

use super::builder::CertCacheBuilder;
use super::traits::CertificateCache;
use crate::backend::KvBackend;
use crate::cancel::CancellationToken;
use crate::encoding::{decode_value, encode_value, key_for_name};
use crate::error::{CertCacheError, Result};

/// Certificate cache bound to one backend connection.
///
/// The connection is created once at construction and shared by every
/// operation and every clone of the cache. Each operation spawns its backend
/// call on a separate task and returns as soon as either that call finishes
/// or the caller's token fires. A call abandoned this way is not aborted; it
/// finishes in the background and its result is dropped.
///
/// # Logging
///
/// Diagnostics are `tracing` events. Without an installed subscriber and
/// without a sink from `CertCacheBuilder::log_writer`, nothing is printed;
/// pass `log_writer(std::io::stdout)` to always get output on stdout.
#[derive(Clone)]
pub struct CertCache {
    backend: Arc<dyn KvBackend>,
    addr: String,
    dispatch: Option<Dispatch>,
}

impl CertCache {
    /// Connect to the Redis server at `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self> {
        CertCacheBuilder::new(addr).connect().await
    }

    /// Create a builder for more control over construction.
    pub fn builder(addr: impl Into<String>) -> CertCacheBuilder {
        CertCacheBuilder::new(addr)
    }

    /// Wrap an already-connected backend.
    pub fn with_backend(backend: Arc<dyn KvBackend>) -> Self {
        CertCacheBuilder::new(backend.describe()).with_backend(backend)
    }

    pub(super) fn from_parts(
        backend: Arc<dyn KvBackend>,
        addr: String,
        dispatch: Option<Dispatch>,
    ) -> Self {
        Self {
            backend,
            addr,
            dispatch,
        }
    }

    /// Address of the backend this cache is bound to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Read the blob stored under `name`.
    ///
    /// Returns `NotFound` if nothing is stored, `Decode` if the stored value
    /// is corrupt, `Backend` for any other backend failure and `Cancelled`
    /// if `cancel` fires before the backend answers.
    pub async fn fetch(&self, cancel: &CancellationToken, name: &str) -> Result<Vec<u8>> {
        self.traced(self.fetch_inner(cancel, name)).await
    }

    /// Store `data` under `name`, replacing any previous blob.
    ///
    /// If `cancel` has fired by the time the write is dispatched, the write
    /// is skipped. A cancellation racing with dispatch may or may not stop it.
    pub async fn store(&self, cancel: &CancellationToken, name: &str, data: &[u8]) -> Result<()> {
        self.traced(self.store_inner(cancel, name, data)).await
    }

    /// Delete the blob stored under `name`. Deleting a missing name succeeds.
    pub async fn remove(&self, cancel: &CancellationToken, name: &str) -> Result<()> {
        self.traced(self.remove_inner(cancel, name)).await
    }

    async fn fetch_inner(&self, cancel: &CancellationToken, name: &str) -> Result<Vec<u8>> {
        let key = key_for_name(name);
        debug!("Fetching certificate for key {}", key);

        let backend = Arc::clone(&self.backend);
        let task_key = key.clone();
        let call = spawn_backend_call(async move { backend.get(&task_key).await });

        match race_cancel(cancel, call).await? {
            Some(raw) => decode_value(&key, &raw).map_err(|e| {
                warn!("Discarding corrupt value for key {}: {}", key, e);
                e
            }),
            None => {
                debug!("No cached certificate for key {}", key);
                Err(CertCacheError::NotFound { key })
            }
        }
    }

    async fn store_inner(&self, cancel: &CancellationToken, name: &str, data: &[u8]) -> Result<()> {
        let key = key_for_name(name);
        debug!("Storing certificate for key {} ({} bytes)", key, data.len());

        let encoded = encode_value(data);
        let backend = Arc::clone(&self.backend);
        let token = cancel.clone();
        let call = spawn_backend_call(async move {
            // Don't overwrite the entry once the caller has given up.
            if token.is_cancelled() {
                debug!("Skipping write for key {}: cancelled before dispatch", key);
                return Err(CertCacheError::Cancelled);
            }
            backend.set(&key, encoded).await
        });

        race_cancel(cancel, call).await
    }

    async fn remove_inner(&self, cancel: &CancellationToken, name: &str) -> Result<()> {
        let key = key_for_name(name);
        debug!("Removing certificate for key {}", key);

        let backend = Arc::clone(&self.backend);
        let task_key = key.clone();
        let call = spawn_backend_call(async move { backend.delete(&task_key).await });

        if !race_cancel(cancel, call).await? {
            debug!("Key {} was not present", key);
        }
        Ok(())
    }

    /// Run `fut` under the injected log sink, if any.
    async fn traced<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match &self.dispatch {
            Some(dispatch) => fut.with_subscriber(dispatch.clone()).await,
            None => fut.await,
        }
    }
}

impl fmt::Debug for CertCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertCache")
            .field("addr", &self.addr)
            .field("log_sink", &self.dispatch.is_some())
            .finish()
    }
}

#[async_trait]
impl CertificateCache for CertCache {
    async fn fetch(&self, cancel: &CancellationToken, name: &str) -> Result<Vec<u8>> {
        CertCache::fetch(self, cancel, name).await
    }

    async fn store(&self, cancel: &CancellationToken, name: &str, data: &[u8]) -> Result<()> {
        CertCache::store(self, cancel, name, data).await
    }

    async fn remove(&self, cancel: &CancellationToken, name: &str) -> Result<()> {
        CertCache::remove(self, cancel, name).await
    }
}

/// Spawn a backend call on its own task, keeping the caller's log sink.
fn spawn_backend_call<T, F>(call: F) -> JoinHandle<Result<T>>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    tokio::spawn(call.with_current_subscriber())
}

/// Wait for `call` unless `cancel` fires first.
///
/// The cancellation branch is polled first, so a token that has already
/// fired always wins. Dropping the join handle detaches the task.
async fn race_cancel<T>(cancel: &CancellationToken, call: JoinHandle<Result<T>>) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CertCacheError::Cancelled),
        joined = call => joined.map_err(|e| {
            CertCacheError::backend(format!("Backend task failed: {}", e), Some(Box::new(e)))
        })?,
    }
}
