//! certcache - command-line access to the certificate cache.
//!
//! Runs a single fetch, store or remove against the backend and exits.
//! Ctrl-C and `--timeout` both cancel the in-flight operation.

mod commands;

use anyhow::{Context, Result};
use certcache::{CacheConfig, CancellationToken, CertCache};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use commands::Outcome;

/// Exit status for a cache miss, distinct from failures (1).
const EXIT_MISS: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "certcache")]
#[command(about = "Inspect and manage cached certificates")]
struct Args {
    /// Backend address (host:port or redis:// URL)
    #[arg(short, long, default_value = CacheConfig::DEFAULT_ADDR)]
    addr: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Cancel the operation after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the blob stored under NAME
    Get {
        name: String,
        /// Write the blob to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Store the contents of FILE under NAME
    Put { name: String, file: PathBuf },
    /// Remove the blob stored under NAME
    Delete { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries blob output.
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let cache = CertCache::connect(&args.addr)
        .await
        .with_context(|| format!("Failed to connect to backend at {}", args.addr))?;
    debug!("Using backend at {}", cache.addr());

    let cancel = CancellationToken::new();
    if let Some(secs) = args.timeout {
        cancel.cancel_after(Duration::from_secs(secs));
    }
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    let mut stdout = std::io::stdout();
    match commands::execute(&cache, &cancel, &args.command, &mut stdout).await? {
        Outcome::Done => Ok(()),
        Outcome::Miss => std::process::exit(EXIT_MISS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_defaults() {
        let args = Args::try_parse_from(["certcache", "get", "example.com"]).unwrap();
        assert_eq!(args.addr, CacheConfig::DEFAULT_ADDR);
        assert!(!args.debug);
        assert_eq!(args.timeout, None);
        assert_eq!(
            args.command,
            Command::Get {
                name: "example.com".into(),
                output: None
            }
        );
    }

    #[test]
    fn test_parse_put_with_options() {
        let args = Args::try_parse_from([
            "certcache",
            "--addr",
            "cache.internal:6380",
            "--timeout",
            "5",
            "put",
            "example.com",
            "cert.pem",
        ])
        .unwrap();
        assert_eq!(args.addr, "cache.internal:6380");
        assert_eq!(args.timeout, Some(5));
        assert_eq!(
            args.command,
            Command::Put {
                name: "example.com".into(),
                file: PathBuf::from("cert.pem")
            }
        );
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Args::try_parse_from(["certcache"]).is_err());
        assert!(Args::try_parse_from(["certcache", "delete"]).is_err());
    }
}
