//! Restore drop/create policy against real `psql`.
//!
//! All tests require Docker and are marked with #[ignore].

use pg_backup_core::{BackupRequest, Error, RestoreRequest};

use super::common::{docker_service, now, PostgresTestServer};

/// Restoring without drop into an existing (empty) database succeeds even
/// though CREATE DATABASE reports that it already exists.
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_restore_without_drop_into_existing_database() {
    let server = PostgresTestServer::start().await.expect("start server");
    server.seed_accounts("appdb", 10).await.unwrap();

    let service = docker_service();
    let out_dir = tempfile::TempDir::new().unwrap();
    let backup = service
        .backup(&BackupRequest {
            container: server.name.clone(),
            database: "appdb".to_string(),
            user: "postgres".to_string(),
            output_dir: out_dir.path().to_path_buf(),
            timestamp: now(),
        })
        .await
        .unwrap();

    server.psql("postgres", "DROP DATABASE appdb").await.unwrap();
    server.psql("postgres", "CREATE DATABASE appdb").await.unwrap();

    service
        .restore(&RestoreRequest {
            container: server.name.clone(),
            database: "appdb".to_string(),
            user: "postgres".to_string(),
            artifact: backup.path,
            drop_existing: false,
        })
        .await
        .expect("Restore should tolerate the existing database");

    assert_eq!(
        server
            .psql("appdb", "SELECT count(*) FROM accounts")
            .await
            .unwrap(),
        "10"
    );
}

/// Backing up a database that does not exist fails with pg_dump's message.
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_backup_missing_database_reports_pg_dump_error() {
    let server = PostgresTestServer::start().await.expect("start server");

    let service = docker_service();
    let out_dir = tempfile::TempDir::new().unwrap();
    let err = service
        .backup(&BackupRequest {
            container: server.name.clone(),
            database: "does_not_exist".to_string(),
            user: "postgres".to_string(),
            output_dir: out_dir.path().to_path_buf(),
            timestamp: now(),
        })
        .await
        .unwrap_err();

    match err {
        Error::Process { diagnostics, .. } => {
            assert!(diagnostics.contains("does_not_exist"));
        }
        other => panic!("Expected process error, got {other}"),
    }
}
