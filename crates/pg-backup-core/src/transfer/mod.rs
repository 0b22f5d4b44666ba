//! Streaming transfer pipeline between external processes and storage.
//!
//! Three paths share the same process plumbing:
//!
//! - **export**: process stdout → compressor → file
//! - **import**: file → decompressor → process stdin
//! - **digest**: process stdout → SHA-256
//!
//! Each path drains the child's stderr on its own task while the main copy
//! runs. A child that fills its stderr pipe while we block on stdout (or
//! stdin) would otherwise deadlock both sides.

mod digest;
mod export;
mod import;

pub use digest::{digest, Digest};
pub use export::export;
pub use import::import;

use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::TransferError;
use crate::{Error, Result};

/// Buffer size for every copy loop
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Byte counts and timing for one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransferStats {
    /// Bytes read from the source (process or artifact)
    pub bytes_read: u64,
    /// Bytes written to the sink (artifact or process)
    pub bytes_written: u64,
    /// Wall time of the transfer
    pub elapsed: Duration,
}

impl TransferStats {
    /// Source-side throughput in MB/s
    pub fn throughput_mb_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.bytes_read as f64 / (1024.0 * 1024.0) / secs
    }
}

/// Human-readable command line, used in logs and errors
pub(crate) fn describe(command: &Command) -> String {
    let std = command.as_std();
    std::iter::once(std.get_program())
        .chain(std.get_args())
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spawn a pipeline child with the given stdin/stdout wiring and piped stderr
pub(crate) fn spawn(
    command: &mut Command,
    label: &str,
    stdin: Stdio,
    stdout: Stdio,
) -> Result<Child> {
    debug!("Spawning: {}", label);
    command
        .stdin(stdin)
        .stdout(stdout)
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            TransferError::Spawn {
                command: label.to_string(),
                message: e.to_string(),
            }
            .into()
        })
}

/// Background collection of a child's stderr
pub(crate) struct StderrDrain {
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl StderrDrain {
    pub(crate) fn start(child: &mut Child) -> Self {
        let handle = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                stderr.read_to_end(&mut buf).await?;
                Ok::<_, std::io::Error>(buf)
            })
        });
        Self { handle }
    }

    /// Wait for the drain to hit EOF and return the text it captured
    pub(crate) async fn finish(self) -> String {
        let Some(handle) = self.handle else {
            return String::new();
        };
        match handle.await {
            Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).trim().to_string(),
            Ok(Err(e)) => {
                warn!("Failed to read diagnostic output: {}", e);
                String::new()
            }
            Err(e) => {
                warn!("Diagnostic reader task failed: {}", e);
                String::new()
            }
        }
    }
}

/// Kill and reap a child after the copy failed
pub(crate) async fn abort(child: &mut Child, label: &str) {
    if let Err(e) = child.start_kill() {
        debug!("Kill of {} failed (already exited?): {}", label, e);
    }
    if let Err(e) = child.wait().await {
        warn!("Failed to reap {}: {}", label, e);
    }
}

/// Wait for the child, then turn a failure status into an error carrying
/// the diagnostics.
pub(crate) async fn finish(
    mut child: Child,
    stderr: StderrDrain,
    label: &str,
) -> Result<String> {
    let status = child.wait().await;
    let diagnostics = stderr.finish().await;
    let status = status.map_err(|e| stream_error(label, e, diagnostics.clone()))?;
    check_exit(label, status, diagnostics)
}

pub(crate) fn check_exit(label: &str, status: ExitStatus, diagnostics: String) -> Result<String> {
    if status.success() {
        if !diagnostics.is_empty() {
            warn!("{} reported: {}", label, diagnostics);
        }
        return Ok(diagnostics);
    }
    Err(Error::Process {
        command: label.to_string(),
        status: status.to_string(),
        diagnostics,
    })
}

pub(crate) fn stream_error(label: &str, err: std::io::Error, diagnostics: String) -> Error {
    TransferError::Stream {
        command: label.to_string(),
        message: err.to_string(),
        diagnostics,
    }
    .into()
}
