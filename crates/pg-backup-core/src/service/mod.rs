//! Backup orchestration service.
//!
//! Composes the transfer pipeline with artifact naming, digests and database
//! lifecycle commands. Each operation is a function of its request plus the
//! state of the containers at call time; nothing is retained between calls.
//!
//! Backups take no snapshot: a dump taken while the source is being written
//! to may be internally inconsistent. Overlapping operations against the same
//! database must be serialized by the caller.

mod backup;
mod restore;
mod round_trip;
mod verify;

pub use backup::BackupOutput;
pub use round_trip::RoundTripReport;
pub use verify::VerifyReport;

use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::container::{ContainerRuntime, DockerRuntime};
use crate::postgres::PgCommands;
use crate::{Error, Result};

/// Parameters of a single backup
#[derive(Debug, Clone)]
pub struct BackupRequest {
    pub container: String,
    pub database: String,
    pub user: String,
    pub output_dir: PathBuf,
    /// Used for naming only
    pub timestamp: NaiveDateTime,
}

/// Parameters of a single restore
#[derive(Debug, Clone)]
pub struct RestoreRequest {
    pub container: String,
    pub database: String,
    pub user: String,
    pub artifact: PathBuf,
    /// Drop and recreate the database before loading
    pub drop_existing: bool,
}

/// Parameters of a content comparison between two containers
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub source: String,
    pub target: String,
    pub database: String,
    pub user: String,
}

/// Backup from `source`, restore into `target` (dropping it first), verify
#[derive(Debug, Clone)]
pub struct RoundTripRequest {
    pub source: String,
    pub target: String,
    pub database: String,
    pub user: String,
    pub output_dir: PathBuf,
    pub timestamp: NaiveDateTime,
}

/// Entry point for backup, restore and verify operations
pub struct BackupService {
    runtime: Arc<dyn ContainerRuntime>,
    config: Config,
    pg: PgCommands,
}

impl BackupService {
    /// Create a service over an explicit runtime
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: Config) -> Self {
        let pg = PgCommands::new(&config.database, &config.restore);
        Self {
            runtime,
            config,
            pg,
        }
    }

    /// Create a service backed by the configured docker-compatible runtime
    pub fn with_docker(config: Config) -> Result<Self> {
        config.validate()?;
        let runtime = Arc::new(DockerRuntime::new(config.runtime.clone()));
        Ok(Self::new(runtime, config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runtime(&self) -> &Arc<dyn ContainerRuntime> {
        &self.runtime
    }
}

/// Container and database names end up as bare positionals in argv
fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{} must not be empty", field)));
    }
    // docker and pg_dump would parse it as an option
    if value.starts_with('-') {
        return Err(Error::Config(format!(
            "{} must not start with '-': {}",
            field, value
        )));
    }
    Ok(())
}
