//! Error types for the certificate cache.
//!
//! `NotFound` is the one variant callers branch on: it means "nothing cached
//! yet" and must never be confused with a backend failure.

use thiserror::Error;

/// Boxed cause carried by backend and connection errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the certificate cache.
#[derive(Debug, Error)]
pub enum CertCacheError {
    #[error("Failed to connect to {addr}: {message}")]
    Connection {
        addr: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("No cached value for key {key}")]
    NotFound { key: String },

    #[error("Backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Stored value for key {key} is not valid base64")]
    Decode {
        key: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Operation was cancelled")]
    Cancelled,
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CertCacheError>;

impl From<redis::RedisError> for CertCacheError {
    fn from(err: redis::RedisError) -> Self {
        CertCacheError::Backend {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl CertCacheError {
    /// Create a backend error with an optional cause.
    pub fn backend(message: impl Into<String>, source: Option<BoxError>) -> Self {
        CertCacheError::Backend {
            message: message.into(),
            source,
        }
    }

    /// Create a connection error for `addr`.
    pub fn connection(
        addr: impl Into<String>,
        message: impl Into<String>,
        source: Option<BoxError>,
    ) -> Self {
        CertCacheError::Connection {
            addr: addr.into(),
            message: message.into(),
            source,
        }
    }

    /// Whether this is a cache miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CertCacheError::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CertCacheError::Cancelled)
    }

    /// Check if this error is worth retrying.
    ///
    /// The cache itself never retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CertCacheError::Backend { .. } | CertCacheError::Connection { .. }
        )
    }
}
