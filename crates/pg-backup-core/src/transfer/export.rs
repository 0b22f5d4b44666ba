//! Export path: process stdout → compressor → file.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::process::Command;
use tracing::{debug, info};

use super::{abort, describe, finish, spawn, stream_error, StderrDrain, TransferStats};
use crate::compression::{self, CompressionType};
use crate::error::TransferError;
use crate::Result;

/// Stream the output of `command` into `destination`, compressing in flight.
///
/// On a non-zero exit the error carries the process's stderr. The partially
/// written destination is left in place for inspection.
pub async fn export(
    mut command: Command,
    destination: &Path,
    compression: CompressionType,
    level: Option<i32>,
) -> Result<TransferStats> {
    let label = describe(&command);
    let start = Instant::now();

    let mut child = spawn(&mut command, &label, Stdio::null(), Stdio::piped())?;
    let stderr = StderrDrain::start(&mut child);
    let Some(mut stdout) = child.stdout.take() else {
        abort(&mut child, &label).await;
        return Err(TransferError::Spawn {
            command: label,
            message: "stdout was not captured".to_string(),
        }
        .into());
    };

    let file = match tokio::fs::File::create(destination).await {
        Ok(file) => file,
        Err(e) => {
            abort(&mut child, &label).await;
            stderr.finish().await;
            return Err(e.into());
        }
    };
    debug!("Writing {:?} artifact to {}", compression, destination.display());

    let mut writer = compression::writer(BufWriter::new(file), compression, level);

    let bytes_read = match tokio::io::copy(&mut stdout, &mut writer).await {
        Ok(n) => n,
        Err(e) => {
            abort(&mut child, &label).await;
            return Err(stream_error(&label, e, stderr.finish().await));
        }
    };

    // Flushes buffered data and writes the compression trailer
    if let Err(e) = writer.shutdown().await {
        abort(&mut child, &label).await;
        return Err(stream_error(&label, e, stderr.finish().await));
    }
    drop(stdout);

    finish(child, stderr, &label).await?;

    let bytes_written = tokio::fs::metadata(destination).await?.len();
    let stats = TransferStats {
        bytes_read,
        bytes_written,
        elapsed: start.elapsed(),
    };

    info!(
        "Exported {} bytes ({} stored) to {} in {:.2}s ({:.2} MB/s)",
        stats.bytes_read,
        stats.bytes_written,
        destination.display(),
        stats.elapsed.as_secs_f64(),
        stats.throughput_mb_per_sec()
    );

    Ok(stats)
}
