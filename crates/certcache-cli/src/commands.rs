//! Command execution.

use anyhow::{Context, Result};
use certcache::{CancellationToken, CertificateCache};
use std::io::Write;
use tracing::info;

use crate::Command;

/// How a command finished, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// `get` found nothing under the name.
    Miss,
}

/// Run `command` against `cache`, writing `get` output to `out` unless a file is given.
pub async fn execute<C, W>(
    cache: &C,
    cancel: &CancellationToken,
    command: &Command,
    out: &mut W,
) -> Result<Outcome>
where
    C: CertificateCache + ?Sized,
    W: Write,
{
    match command {
        Command::Get { name, output } => {
            let data = match cache.fetch(cancel, name).await {
                Ok(data) => data,
                Err(e) if e.is_not_found() => {
                    info!("No cached certificate for {}", name);
                    return Ok(Outcome::Miss);
                }
                Err(e) => return Err(e).with_context(|| format!("Failed to fetch {}", name)),
            };

            match output {
                Some(path) => {
                    tokio::fs::write(path, &data)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} bytes to {}", data.len(), path.display());
                }
                None => {
                    out.write_all(&data).context("Failed to write output")?;
                    out.flush().context("Failed to write output")?;
                }
            }
        }
        Command::Put { name, file } => {
            let data = tokio::fs::read(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            cache
                .store(cancel, name, &data)
                .await
                .with_context(|| format!("Failed to store {}", name))?;
            info!("Stored {} bytes under {}", data.len(), name);
        }
        Command::Delete { name } => {
            cache
                .remove(cancel, name)
                .await
                .with_context(|| format!("Failed to remove {}", name))?;
            info!("Removed {}", name);
        }
    }

    Ok(Outcome::Done)
}
