//! Redis-backed key-value store.

use super::traits::KvBackend;
use crate::config::CacheConfig;
use crate::error::{CertCacheError, Result};
use ::redis::aio::MultiplexedConnection;
use ::redis::AsyncCommands;
use async_trait::async_trait;
use tracing::debug;

/// Redis backend over a single multiplexed connection.
///
/// The connection is opened once and shared by every operation. Commands
/// issued concurrently are pipelined over it by the client; there is no
/// pooling and no reconnect logic here.
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
    addr: String,
}

impl RedisBackend {
    /// Connect to the Redis server at `addr`.
    ///
    /// `addr` is `host:port`; a full `redis://` or `rediss://` URL is passed
    /// through unchanged. Fails fast with `Connection` if the server cannot
    /// be reached within `CacheConfig::CONNECT_TIMEOUT`.
    pub async fn connect(addr: &str) -> Result<Self> {
        let url = connection_url(addr);

        let client = ::redis::Client::open(url.as_str()).map_err(|e| {
            CertCacheError::connection(
                addr,
                format!("Invalid backend address: {}", e),
                Some(Box::new(e)),
            )
        })?;

        let conn = tokio::time::timeout(
            CacheConfig::CONNECT_TIMEOUT,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            CertCacheError::connection(
                addr,
                format!("Timed out after {:?}", CacheConfig::CONNECT_TIMEOUT),
                None,
            )
        })?
        .map_err(|e| CertCacheError::connection(addr, e.to_string(), Some(Box::new(e))))?;

        debug!("Connected to Redis at {}", addr);

        Ok(Self {
            conn,
            addr: addr.to_string(),
        })
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    fn describe(&self) -> String {
        self.addr.clone()
    }
}

/// Turn a `host:port` address into a connection URL.
fn connection_url(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("redis://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::CertCache;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    type Entries = Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>;

    /// Key the test server treats as holding a non-string value.
    const WRONG_TYPE_KEY: &[u8] = b"certcache/wrongtype";

    /// Start a minimal RESP server understanding GET, SET and DEL.
    ///
    /// Every other command (the client's CLIENT SETINFO handshake) gets `+OK`.
    async fn start_test_server() -> (String, Entries) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let entries: Entries = Arc::default();

        let shared = Arc::clone(&entries);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let entries = Arc::clone(&shared);
                tokio::spawn(async move {
                    let (read, mut write) = stream.into_split();
                    let mut reader = BufReader::new(read);
                    while let Ok(Some(args)) = read_command(&mut reader).await {
                        let response = reply(&args, &entries);
                        if write.write_all(&response).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        (addr, entries)
    }

    /// Read one `*N` array of bulk strings. `None` on EOF.
    async fn read_command<R>(reader: &mut R) -> std::io::Result<Option<Vec<Vec<u8>>>>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let count: usize = line.trim_end().trim_start_matches('*').parse().unwrap();

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            line.clear();
            reader.read_line(&mut line).await?;
            let len: usize = line.trim_end().trim_start_matches('$').parse().unwrap();
            let mut arg = vec![0; len + 2];
            reader.read_exact(&mut arg).await?;
            arg.truncate(len);
            args.push(arg);
        }
        Ok(Some(args))
    }

    fn reply(args: &[Vec<u8>], entries: &Entries) -> Vec<u8> {
        let command = String::from_utf8_lossy(&args[0]).to_ascii_uppercase();
        let mut entries = entries.lock().unwrap();
        match command.as_str() {
            "GET" if args[1] == WRONG_TYPE_KEY => {
                b"-WRONGTYPE Operation against a key holding the wrong kind of value\r\n".to_vec()
            }
            "GET" => match entries.get(&args[1]) {
                Some(value) => {
                    let mut out = format!("${}\r\n", value.len()).into_bytes();
                    out.extend_from_slice(value);
                    out.extend_from_slice(b"\r\n");
                    out
                }
                None => b"$-1\r\n".to_vec(),
            },
            "SET" => {
                entries.insert(args[1].clone(), args[2].clone());
                b"+OK\r\n".to_vec()
            }
            "DEL" => {
                let removed = entries.remove(&args[1]).is_some();
                format!(":{}\r\n", removed as i64).into_bytes()
            }
            _ => b"+OK\r\n".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_backend_commands() {
        let (addr, entries) = start_test_server().await;
        let backend = RedisBackend::connect(&addr).await.unwrap();
        assert_eq!(backend.describe(), addr);

        assert_eq!(backend.get("certcache/example.com").await.unwrap(), None);

        backend
            .set("certcache/example.com", "AQID".to_string())
            .await
            .unwrap();
        assert_eq!(
            entries.lock().unwrap().get(b"certcache/example.com".as_slice()),
            Some(&b"AQID".to_vec())
        );
        assert_eq!(
            backend.get("certcache/example.com").await.unwrap(),
            Some(b"AQID".to_vec())
        );

        assert!(backend.delete("certcache/example.com").await.unwrap());
        assert!(!backend.delete("certcache/example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_type_reply_is_backend_error() {
        let (addr, _entries) = start_test_server().await;
        let backend = RedisBackend::connect(&addr).await.unwrap();

        let err = backend.get("certcache/wrongtype").await.unwrap_err();
        assert!(matches!(err, CertCacheError::Backend { .. }));
        assert!(err.to_string().contains("WRONGTYPE"));
    }

    #[tokio::test]
    async fn test_cache_over_redis() {
        let (addr, entries) = start_test_server().await;
        let cache = CertCache::connect(&addr).await.unwrap();
        let ctx = CancellationToken::new();

        match cache.fetch(&ctx, "example.com").await.unwrap_err() {
            CertCacheError::NotFound { key } => assert_eq!(key, "certcache/example.com"),
            other => panic!("expected NotFound, got {other:?}"),
        }

        cache.store(&ctx, "example.com", &[0x01, 0x02, 0x03]).await.unwrap();
        assert_eq!(
            entries.lock().unwrap().get(b"certcache/example.com".as_slice()),
            Some(&b"AQID".to_vec())
        );
        assert_eq!(
            cache.fetch(&ctx, "example.com").await.unwrap(),
            vec![0x01, 0x02, 0x03]
        );

        cache.remove(&ctx, "example.com").await.unwrap();
        cache.remove(&ctx, "example.com").await.unwrap();
        assert!(cache.fetch(&ctx, "example.com").await.unwrap_err().is_not_found());

        let err = cache.fetch(&ctx, "wrongtype").await.unwrap_err();
        assert!(matches!(err, CertCacheError::Backend { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_connection_url() {
        assert_eq!(connection_url("127.0.0.1:6379"), "redis://127.0.0.1:6379");
        assert_eq!(connection_url("cache.internal:6380"), "redis://cache.internal:6380");
        assert_eq!(
            connection_url("rediss://cache.internal:6380/2"),
            "rediss://cache.internal:6380/2"
        );
    }

    #[tokio::test]
    async fn test_connect_invalid_address() {
        let err = RedisBackend::connect("localhost:notaport")
            .await
            .err()
            .expect("invalid address should fail");
        assert!(matches!(err, CertCacheError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Port 1 is reserved (tcpmux) and not expected to run Redis.
        let err = RedisBackend::connect("127.0.0.1:1")
            .await
            .err()
            .expect("nothing should be listening");
        match err {
            CertCacheError::Connection { addr, .. } => assert_eq!(addr, "127.0.0.1:1"),
            other => panic!("expected connection error, got {other:?}"),
        }
    }
}
