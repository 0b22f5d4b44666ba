//! Digest path: process stdout → SHA-256.
//!
//! Dumps carry lines that differ between two runs over identical data: the
//! `--` comment header (server and client versions) and, on current
//! releases, the `\restrict`/`\unrestrict` meta-commands with a random key.
//! Those lines are dropped before hashing so the digest covers content only.

use sha2::{Digest as _, Sha256};
use std::fmt;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use super::{
    abort, describe, finish, spawn, stream_error, StderrDrain, TransferStats, COPY_BUFFER_SIZE,
};
use crate::error::TransferError;
use crate::Result;

/// Fixed-size fingerprint of a dump stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Digest of an in-memory byte slice
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Digest of an in-memory dump, normalized like the streaming path
    pub fn of_dump(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        let mut filter = DumpFilter::default();
        filter.update(&mut hasher, data);
        filter.finish(&mut hasher);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Line prefixes excluded from the digest
const VOLATILE_PREFIXES: [&[u8]; 3] = [b"--", b"\\restrict", b"\\unrestrict"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    /// Start of a line, not yet classified
    Head,
    Keep,
    Skip,
}

/// Streaming line filter in front of the hasher.
///
/// Only the first few bytes of a line are held back until the line can be
/// classified, so memory stays bounded whatever the row width.
#[derive(Debug)]
struct DumpFilter {
    head: Vec<u8>,
    state: LineState,
}

impl Default for DumpFilter {
    fn default() -> Self {
        Self {
            head: Vec::with_capacity(16),
            state: LineState::Head,
        }
    }
}

impl DumpFilter {
    fn update(&mut self, hasher: &mut Sha256, mut data: &[u8]) {
        while !data.is_empty() {
            match self.state {
                LineState::Keep | LineState::Skip => {
                    let (chunk, rest, eol) = match data.iter().position(|b| *b == b'\n') {
                        Some(i) => (&data[..=i], &data[i + 1..], true),
                        None => (data, &data[data.len()..], false),
                    };
                    if self.state == LineState::Keep {
                        hasher.update(chunk);
                    }
                    if eol {
                        self.state = LineState::Head;
                    }
                    data = rest;
                }
                LineState::Head => {
                    let byte = data[0];
                    data = &data[1..];
                    self.head.push(byte);
                    if let Some(keep) = classify(&self.head) {
                        if keep {
                            hasher.update(&self.head);
                        }
                        self.head.clear();
                        self.state = match (byte == b'\n', keep) {
                            (true, _) => LineState::Head,
                            (false, true) => LineState::Keep,
                            (false, false) => LineState::Skip,
                        };
                    }
                }
            }
        }
    }

    /// Flush a final line that had no newline
    fn finish(self, hasher: &mut Sha256) {
        if self.state == LineState::Head && !self.head.is_empty() {
            hasher.update(&self.head);
        }
    }
}

/// `Some(true)` keep, `Some(false)` skip, `None` while `head` is still a
/// proper prefix of a volatile marker.
fn classify(head: &[u8]) -> Option<bool> {
    if VOLATILE_PREFIXES.iter().any(|p| head.starts_with(p)) {
        return Some(false);
    }
    if VOLATILE_PREFIXES.iter().any(|p| p.starts_with(head)) {
        return None;
    }
    Some(true)
}

/// Reduce the stdout of `command` to a digest without buffering it.
///
/// Comment and `\restrict` lines are skipped (see the module docs). A
/// non-zero exit is an error, never a digest.
pub async fn digest(mut command: Command) -> Result<(Digest, TransferStats)> {
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

    let mut hasher = Sha256::new();
    let mut filter = DumpFilter::default();
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut bytes_read: u64 = 0;

    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                filter.update(&mut hasher, &buf[..n]);
                bytes_read += n as u64;
            }
            Err(e) => {
                abort(&mut child, &label).await;
                return Err(stream_error(&label, e, stderr.finish().await));
            }
        }
    }
    drop(stdout);

    finish(child, stderr, &label).await?;

    filter.finish(&mut hasher);
    let digest = Digest(hasher.finalize().into());
    let stats = TransferStats {
        bytes_read,
        bytes_written: 0,
        elapsed: start.elapsed(),
    };
    debug!("{} produced {} bytes, digest {}", label, bytes_read, digest);

    Ok((digest, stats))
}
