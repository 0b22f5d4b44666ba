//! Import path: file → decompressor → process stdin.

use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::info;

use super::{
    abort, describe, finish, spawn, stream_error, StderrDrain, TransferStats, COPY_BUFFER_SIZE,
};
use crate::artifact::ArtifactReader;
use crate::error::{ArtifactError, TransferError};
use crate::Result;

/// Feed the decompressed contents of `artifact` into the stdin of `command`.
///
/// A decompression failure aborts with `ArtifactError::Corrupt`. The child is
/// killed at that point and may already have consumed part of the input.
pub async fn import(artifact: &mut ArtifactReader, mut command: Command) -> Result<TransferStats> {
    let label = describe(&command);
    let start = Instant::now();

    let mut child = spawn(&mut command, &label, Stdio::piped(), Stdio::null())?;
    let stderr = StderrDrain::start(&mut child);
    let Some(mut stdin) = child.stdin.take() else {
        abort(&mut child, &label).await;
        return Err(TransferError::Spawn {
            command: label,
            message: "stdin was not captured".to_string(),
        }
        .into());
    };

    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut bytes_written: u64 = 0;

    loop {
        let read = artifact.reader_mut().read(&mut buf).await;
        let n = match read {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                drop(stdin);
                abort(&mut child, &label).await;
                return Err(ArtifactError::Corrupt {
                    path: artifact.path().to_path_buf(),
                    message: e.to_string(),
                    diagnostics: stderr.finish().await,
                }
                .into());
            }
        };

        if let Err(e) = stdin.write_all(&buf[..n]).await {
            drop(stdin);
            return Err(write_failed(child, stderr, &label, e).await);
        }
        bytes_written += n as u64;
    }

    // Closing stdin signals end of input
    if let Err(e) = stdin.flush().await {
        drop(stdin);
        return Err(write_failed(child, stderr, &label, e).await);
    }
    drop(stdin);

    finish(child, stderr, &label).await?;

    let stats = TransferStats {
        bytes_read: artifact.size(),
        bytes_written,
        elapsed: start.elapsed(),
    };

    info!(
        "Imported {} ({} bytes, {} decompressed) in {:.2}s",
        artifact.path().display(),
        stats.bytes_read,
        stats.bytes_written,
        stats.elapsed.as_secs_f64()
    );

    Ok(stats)
}

/// The child stopped reading. A broken pipe means it closed stdin, usually by
/// exiting, so its status and diagnostics explain the failure better than the
/// pipe error does.
async fn write_failed(
    mut child: Child,
    stderr: StderrDrain,
    label: &str,
    err: std::io::Error,
) -> crate::Error {
    if err.kind() == std::io::ErrorKind::BrokenPipe {
        return match finish(child, stderr, label).await {
            Err(e) => e,
            Ok(diagnostics) => stream_error(label, err, diagnostics),
        };
    }
    abort(&mut child, label).await;
    stream_error(label, err, stderr.finish().await)
}
