//! Transfer pipeline unit tests.
//!
//! Exercises the export/import/digest paths against local `sh` processes:
//! - Large payloads streamed end to end
//! - Chatty stderr that would deadlock without a concurrent drain
//! - Failure statuses carrying diagnostics

use tokio::process::Command;

use pg_backup_core::transfer::{self, Digest};
use pg_backup_core::{ArtifactError, ArtifactReader, CompressionType, Error};

use super::helpers::read_artifact;

fn sh(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

/// Writes ~250KB to stderr, well past a pipe buffer
const NOISY_STDERR: &str =
    "i=0; while [ $i -lt 5000 ]; do echo \"NOTICE: relation $i does not exist, skipping\" >&2; i=$((i+1)); done";

#[tokio::test]
async fn export_streams_large_output_with_noisy_stderr() {
    let dir = tempfile::TempDir::new().unwrap();
    let dest = dir.path().join("big.sql.gz");

    let script = format!("{NOISY_STDERR}; head -c 4194304 /dev/zero");
    let stats = transfer::export(sh(&script), &dest, CompressionType::Gzip, None)
        .await
        .expect("Export failed");

    assert_eq!(stats.bytes_read, 4 * 1024 * 1024);
    assert!(stats.bytes_written < stats.bytes_read / 100);
    let restored = read_artifact(&dest).await;
    assert_eq!(restored.len(), 4 * 1024 * 1024);
    assert!(restored.iter().all(|b| *b == 0));
}

#[tokio::test]
async fn export_failure_keeps_partial_artifact() {
    let dir = tempfile::TempDir::new().unwrap();
    let dest = dir.path().join("partial.sql.gz");

    let err = transfer::export(
        sh("echo 'CREATE TABLE t (id int);'; echo 'pg_dump: error: query failed' >&2; exit 1"),
        &dest,
        CompressionType::Gzip,
        None,
    )
    .await
    .unwrap_err();

    match err {
        Error::Process {
            status,
            diagnostics,
            ..
        } => {
            assert!(status.contains('1'));
            assert_eq!(diagnostics, "pg_dump: error: query failed");
        }
        other => panic!("Expected process error, got {other}"),
    }
    assert_eq!(read_artifact(&dest).await, b"CREATE TABLE t (id int);\n");
}

#[tokio::test]
async fn import_feeds_decompressed_bytes_to_stdin() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("in.sql.zst");
    let sink = dir.path().join("received");

    let payload = super::helpers::generate_repetitive_bytes(3 * 1024 * 1024 + 17);
    super::helpers::write_artifact(&src, &payload, CompressionType::Zstd).await;

    // Emit a pipe's worth of stderr before reading stdin at all
    let script = format!("{NOISY_STDERR}; cat > '{}'", sink.display());
    let mut artifact = ArtifactReader::open(&src).await.unwrap();
    let stats = transfer::import(&mut artifact, sh(&script))
        .await
        .expect("Import failed");

    assert_eq!(stats.bytes_written, payload.len() as u64);
    assert_eq!(stats.bytes_read, std::fs::metadata(&src).unwrap().len());
    assert_eq!(std::fs::read(&sink).unwrap(), payload);
}

#[tokio::test]
async fn import_non_zero_exit_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("in.sql.gz");
    super::helpers::write_artifact(&src, b"SELECT 1;\n", CompressionType::Gzip).await;

    let mut artifact = ArtifactReader::open(&src).await.unwrap();
    let err = transfer::import(
        &mut artifact,
        sh("cat > /dev/null; echo 'ERROR:  syntax error at or near \"SELEC\"' >&2; exit 3"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Process { .. }));
    assert!(err.diagnostics().unwrap().contains("syntax error"));
}

#[tokio::test]
async fn import_truncated_artifact_reports_restore_output() {
    let dir = tempfile::TempDir::new().unwrap();
    let src = dir.path().join("in.sql.gz");
    let payload = super::helpers::generate_repetitive_bytes(4 * 1024 * 1024);
    super::helpers::write_artifact(&src, &payload, CompressionType::Gzip).await;
    let stored = std::fs::read(&src).unwrap();
    std::fs::write(&src, &stored[..stored.len() / 2]).unwrap();

    let mut artifact = ArtifactReader::open(&src).await.unwrap();
    let err = transfer::import(
        &mut artifact,
        sh("echo 'ERROR:  invalid input syntax' >&2; cat > /dev/null"),
    )
    .await
    .unwrap_err();

    match &err {
        Error::Artifact(ArtifactError::Corrupt {
            message,
            diagnostics,
            ..
        }) => {
            assert!(!message.contains("invalid input syntax"));
            assert_eq!(diagnostics, "ERROR:  invalid input syntax");
        }
        other => panic!("Expected corrupt artifact, got {other}"),
    }
    assert_eq!(err.diagnostics(), Some("ERROR:  invalid input syntax"));
}

#[tokio::test]
async fn digest_is_deterministic_and_content_sensitive() {
    let (a, _) = transfer::digest(sh("printf 'row 1\\nrow 2\\n'")).await.unwrap();
    let (b, _) = transfer::digest(sh("printf 'row 1\\nrow 2\\n'")).await.unwrap();
    let (c, _) = transfer::digest(sh("printf 'row 1\\nrow 3\\n'")).await.unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, Digest::of(b"row 1\nrow 2\n"));
}

#[tokio::test]
async fn digest_ignores_stderr() {
    let (noisy, _) = transfer::digest(sh("echo 'WARNING: something' >&2; printf 'data'"))
        .await
        .unwrap();
    assert_eq!(noisy, Digest::of(b"data"));
}

#[tokio::test]
async fn digest_failure_is_not_a_digest() {
    let err = transfer::digest(sh("printf 'partial'; echo 'pg_dump: error: lost connection' >&2; exit 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Process { .. }));
}
