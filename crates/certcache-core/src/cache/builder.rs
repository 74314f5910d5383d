//! Builder for configuring CertCache construction.

use std::sync::Arc;

use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Level};
use tracing_subscriber::fmt::MakeWriter;

use super::cert_cache::CertCache;
use crate::backend::{KvBackend, RedisBackend};
use crate::error::Result;

/// Builder for configuring CertCache construction.
///
/// # Example
///
/// ```rust,ignore
/// use certcache::CertCache;
///
/// let cache = CertCache::builder("127.0.0.1:6379")
///     .log_writer(std::io::stdout)
///     .connect()
///     .await?;
/// ```
pub struct CertCacheBuilder {
    addr: String,
    log_level: Level,
    log_sink: Option<MakeDispatch>,
}

/// Builds the sink's dispatcher once the final log level is known.
type MakeDispatch = Box<dyn FnOnce(Level) -> Dispatch + Send + Sync>;

impl CertCacheBuilder {
    /// Create a new builder for the backend at `addr`.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            log_level: Level::DEBUG,
            log_sink: None,
        }
    }

    /// Most verbose level written to an injected log sink.
    ///
    /// Applies to the sink set with `log_writer`, in either call order.
    ///
    /// Default: `DEBUG`
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Send the cache's diagnostics to `writer` instead of the global subscriber.
    ///
    /// Anything implementing `MakeWriter` works: `std::io::stdout`,
    /// `std::io::stderr`, or a closure returning a writer.
    ///
    /// Default: events go to whatever `tracing` subscriber the process installed.
    pub fn log_writer<W>(mut self, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        self.log_sink = Some(Box::new(move |level: Level| {
            let subscriber = tracing_subscriber::fmt()
                .with_writer(writer)
                .with_max_level(level)
                .with_ansi(false)
                .with_target(false)
                .finish();
            Dispatch::new(subscriber)
        }));
        self
    }

    fn build_dispatch(&mut self) -> Option<Dispatch> {
        let level = self.log_level;
        self.log_sink.take().map(|make| make(level))
    }

    /// Open the Redis connection and build the cache.
    ///
    /// Fails with `Connection` if the backend is unreachable. No retry.
    pub async fn connect(mut self) -> Result<CertCache> {
        let dispatch = self.build_dispatch();
        let connect = RedisBackend::connect(&self.addr);
        let backend = match &dispatch {
            Some(dispatch) => connect.with_subscriber(dispatch.clone()).await?,
            None => connect.await?,
        };
        Ok(CertCache::from_parts(Arc::new(backend), self.addr, dispatch))
    }

    /// Build the cache on an already-connected backend.
    ///
    /// The builder's address is replaced by the backend's own description.
    pub fn with_backend(mut self, backend: Arc<dyn KvBackend>) -> CertCache {
        let dispatch = self.build_dispatch();
        let addr = backend.describe();
        CertCache::from_parts(backend, addr, dispatch)
    }
}
